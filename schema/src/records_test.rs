use super::*;

#[test]
fn user_record_without_status_reads_as_active() {
    let user: UserRecord = serde_json::from_value(serde_json::json!({
        "email": "a@b.com",
        "role": "worker",
        "tenantId": "t1"
    }))
    .unwrap();
    assert_eq!(user.status, UserStatus::Active);
    assert_eq!(user.tenant_id.as_deref(), Some("t1"));
    assert_eq!(user.name(), "a@b.com");
}

#[test]
fn id_is_read_but_never_written() {
    let goal: Goal = serde_json::from_value(serde_json::json!({
        "id": "g1",
        "tenantId": "t1",
        "userId": "u1",
        "title": "Ship it",
        "weight": 40
    }))
    .unwrap();
    assert_eq!(goal.id, "g1");
    assert_eq!(goal.status, GoalStatus::Draft);

    let json = serde_json::to_value(&goal).unwrap();
    assert!(json.get("id").is_none());
    assert_eq!(json["userId"], "u1");
}

#[test]
fn invitation_usable_until_expiry_or_use() {
    let mut invitation = Invitation {
        id: "tok".into(),
        email: "new@demo.com".into(),
        role: Role::Worker,
        tenant_id: "t1".into(),
        tenant_name: None,
        used: false,
        expires_at: Some(1_000),
        created_by: None,
    };
    assert!(invitation.is_usable(999));
    assert!(!invitation.is_usable(1_000));

    invitation.expires_at = None;
    assert!(invitation.is_usable(i64::MAX));

    invitation.used = true;
    assert!(!invitation.is_usable(0));
}

#[test]
fn role_parse_is_case_insensitive() {
    assert_eq!(Role::parse(" Admin "), Some(Role::Admin));
    assert_eq!(Role::parse("EVALUATOR"), Some(Role::Evaluator));
    assert_eq!(Role::parse("owner"), None);
}

#[test]
fn collection_names_round_trip_through_parse() {
    for collection in Collection::ALL {
        assert_eq!(Collection::parse(collection.as_str()), Some(collection));
    }
    assert_eq!(Collection::parse("boards"), None);
}

#[test]
fn evaluation_scores_deserialize_from_map() {
    let evaluation: Evaluation = serde_json::from_value(serde_json::json!({
        "tenantId": "t1",
        "targetUserId": "u1",
        "evaluatorId": "u2",
        "period": "2026-H1",
        "scores": {"g1": 4, "g2": 5},
        "totalScore": 4
    }))
    .unwrap();
    assert_eq!(evaluation.scores.get("g2"), Some(&5));
    assert!((evaluation.total_score - 4.0).abs() < f64::EPSILON);
    assert_eq!(evaluation.status, EvaluationStatus::Draft);
}
