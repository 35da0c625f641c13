//! Scoring a worker's approved goals for the current period.
//!
//! DESIGN
//! ======
//! Without `?target=` the page lists the tenant members the reviewer can
//! evaluate. With a target it shows one 1-5 score per approved goal plus a
//! comment. The total is the weight-averaged score over the goals that were
//! scored, rounded to two decimals.
//!
//! One evaluation exists per (evaluator, target, period). Saving again
//! overwrites the draft; once submitted it is read-only.

use std::collections::BTreeMap;

use async_trait::async_trait;
use leptos::prelude::*;
use schema::{Collection, Evaluation, EvaluationStatus, Goal, GoalStatus, Role, UserRecord};

use super::{Page, PageError, PageRequest, PageView, require_role};
use crate::app::AppContext;
use crate::auth::Session;
use crate::components::error_panel::ErrorPanel;
use crate::components::page_frame::{AppLink, Badge, DataTable, EmptyState, FormMessage, PageFrame};
use crate::net::store::{DataStore, Filter, add_record, get_record, query_records, set_record};
use crate::router::REVIEWERS;
use crate::util::dates::period_label;
use crate::util::task::{now_ms, spawn_local};

#[cfg(test)]
#[path = "evaluation_form_test.rs"]
mod evaluation_form_test;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

/// Parse one score field. Blank means "not scored".
///
/// # Errors
///
/// A user-facing message for anything that is not a whole number 1-5.
pub fn parse_score(raw: &str) -> Result<Option<u8>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<u8>() {
        Ok(score) if (MIN_SCORE..=MAX_SCORE).contains(&score) => Ok(Some(score)),
        _ => Err(format!("Scores must be whole numbers from {MIN_SCORE} to {MAX_SCORE}.")),
    }
}

/// Parse the raw score of every goal in `goal_ids`; goals without an entry
/// are unscored.
///
/// # Errors
///
/// The first invalid score, as a user-facing message.
pub fn collect_scores(goal_ids: &[String], raw: &BTreeMap<String, String>) -> Result<BTreeMap<String, u8>, String> {
    let mut scores = BTreeMap::new();
    for goal_id in goal_ids {
        if let Some(score) = parse_score(raw.get(goal_id).map_or("", String::as_str))? {
            scores.insert(goal_id.clone(), score);
        }
    }
    Ok(scores)
}

/// Σ(weight × score) / Σweight over the scored goals, rounded to two
/// decimals. Zero when nothing carrying weight was scored.
#[must_use]
pub fn weighted_score(goals: &[Goal], scores: &BTreeMap<String, u8>) -> f64 {
    let (weighted, weight) = goals
        .iter()
        .filter_map(|g| scores.get(&g.id).map(|s| (f64::from(g.weight) * f64::from(*s), f64::from(g.weight))))
        .fold((0.0, 0.0), |(ws, w), (a, b)| (ws + a, w + b));
    if weight <= 0.0 {
        return 0.0;
    }
    (weighted / weight * 100.0).round() / 100.0
}

/// Approved goals of `uid`.
///
/// # Errors
///
/// Store failures.
pub async fn approved_goals(store: &dyn DataStore, uid: &str) -> Result<Vec<Goal>, PageError> {
    let mut goals: Vec<Goal> = query_records(
        store,
        Collection::Goals,
        &[Filter::eq("userId", uid), Filter::eq("status", GoalStatus::Approved.as_str())],
    )
    .await?;
    goals.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(goals)
}

async fn existing(store: &dyn DataStore, evaluator: &str, target: &str, period: &str) -> Result<Option<Evaluation>, PageError> {
    let found: Vec<Evaluation> = query_records(
        store,
        Collection::Evaluations,
        &[
            Filter::eq("evaluatorId", evaluator),
            Filter::eq("targetUserId", target),
            Filter::eq("period", period),
        ],
    )
    .await?;
    Ok(found.into_iter().next())
}

/// The target user, if the reviewer may evaluate them.
async fn evaluable(store: &dyn DataStore, session: &Session, target: &str) -> Result<UserRecord, String> {
    if target == session.uid {
        return Err("You cannot evaluate yourself.".to_owned());
    }
    let user = get_record::<UserRecord>(store, Collection::Users, target)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "That user does not exist.".to_owned())?;
    if user.tenant_id.as_deref() != Some(session.tenant()) {
        return Err(PageError::Forbidden.to_string());
    }
    Ok(user)
}

/// Save (or submit) the signed-in reviewer's evaluation of `target` for the
/// current period and return its id.
///
/// # Errors
///
/// Validation, permission and store failures as user-facing messages.
pub async fn save_evaluation(
    ctx: &AppContext,
    target: &str,
    scores: BTreeMap<String, u8>,
    comment: &str,
    submit: bool,
) -> Result<String, String> {
    let session = require_role(ctx, REVIEWERS).map_err(|e| e.to_string())?;
    let store = ctx.store();
    evaluable(store.as_ref(), &session, target).await?;

    let goals = approved_goals(store.as_ref(), target).await.map_err(|e| e.to_string())?;
    if let Some((goal_id, _)) = scores.iter().find(|(id, _)| !goals.iter().any(|g| &g.id == *id)) {
        return Err(format!("Goal {goal_id} is not an approved goal of this person."));
    }
    if scores.values().any(|s| !(MIN_SCORE..=MAX_SCORE).contains(s)) {
        return Err(format!("Scores must be whole numbers from {MIN_SCORE} to {MAX_SCORE}."));
    }
    if submit && goals.iter().any(|g| !scores.contains_key(&g.id)) {
        return Err("Score every goal before submitting.".to_owned());
    }

    let now = now_ms();
    let period = period_label(now);
    let previous = existing(store.as_ref(), &session.uid, target, &period)
        .await
        .map_err(|e| e.to_string())?;
    if previous.as_ref().is_some_and(|e| e.status == EvaluationStatus::Submitted) {
        return Err("This evaluation has already been submitted.".to_owned());
    }

    let evaluation = Evaluation {
        id: String::new(),
        tenant_id: session.tenant().to_owned(),
        target_user_id: target.to_owned(),
        evaluator_id: session.uid.clone(),
        period,
        total_score: weighted_score(&goals, &scores),
        scores,
        comment: comment.trim().to_owned(),
        status: if submit { EvaluationStatus::Submitted } else { EvaluationStatus::Draft },
        updated_at: Some(now),
    };
    let id = match previous {
        Some(previous) => {
            set_record(store.as_ref(), Collection::Evaluations, &previous.id, &evaluation)
                .await
                .map_err(|e| e.to_string())?;
            previous.id
        }
        None => add_record(store.as_ref(), Collection::Evaluations, &evaluation)
            .await
            .map_err(|e| e.to_string())?,
    };
    log::info!("evaluations: {} saved {id} for {target} (submitted: {submit})", session.uid);
    Ok(id)
}

/// A reviewer's form for one target in the current period.
#[derive(Clone, Debug)]
struct ScoreSheet {
    target: String,
    period: String,
    goals: Vec<Goal>,
    previous: Option<Evaluation>,
}

impl ScoreSheet {
    fn locked(&self) -> bool {
        self.previous.as_ref().is_some_and(|e| e.status == EvaluationStatus::Submitted)
    }
}

#[component]
fn ScoreSelect(goal_id: String, current: Option<u8>, locked: bool, raw: RwSignal<BTreeMap<String, String>>) -> impl IntoView {
    let key = goal_id.clone();
    view! {
        <select
            data-goal=goal_id
            disabled=locked
            on:change=move |ev| {
                let value = event_target_value(&ev);
                raw.update(|raw| {
                    raw.insert(key.clone(), value);
                });
            }
        >
            <option value="">"-"</option>
            {(MIN_SCORE..=MAX_SCORE)
                .map(|score| {
                    view! {
                        <option value=score.to_string() selected={current == Some(score)}>
                            {score.to_string()}
                        </option>
                    }
                })
                .collect_view()}
        </select>
    }
}

#[component]
fn ScoreForm(ctx: AppContext, sheet: ScoreSheet) -> impl IntoView {
    let locked = sheet.locked();
    let initial = sheet.previous.as_ref().map(|e| e.scores.clone()).unwrap_or_default();
    let comment_text = sheet.previous.as_ref().map(|e| e.comment.clone()).unwrap_or_default();
    let ctx = StoredValue::new_local(ctx);
    let raw = RwSignal::new(initial.iter().map(|(id, score)| (id.clone(), score.to_string())).collect::<BTreeMap<_, _>>());
    let comment = RwSignal::new(comment_text.clone());
    let message = RwSignal::new(String::new());
    let goal_ids = StoredValue::new(sheet.goals.iter().map(|g| g.id.clone()).collect::<Vec<_>>());
    let goals = StoredValue::new(sheet.goals.clone());
    let target = StoredValue::new(sheet.target.clone());
    let status = if locked { "submitted" } else { "draft" };

    let save = move |submit: bool| {
        let scores = match goal_ids.with_value(|ids| raw.with_untracked(|raw| collect_scores(ids, raw))) {
            Ok(scores) => scores,
            Err(text) => {
                message.set(text);
                return;
            }
        };
        let ctx = ctx.get_value();
        let target = target.get_value();
        let comment = comment.get_untracked();
        spawn_local(async move {
            match save_evaluation(&ctx, &target, scores, &comment, submit).await {
                Ok(_) => ctx.navigator().refresh(),
                Err(text) => message.set(text),
            }
        });
    };
    let live_score = move || {
        let scores = goal_ids
            .with_value(|ids| raw.with(|raw| collect_scores(ids, raw)))
            .unwrap_or_default();
        format!("{:.2}", goals.with_value(|goals| weighted_score(goals, &scores)))
    };

    let rows = sheet
        .goals
        .into_iter()
        .map(|goal| {
            let current = initial.get(&goal.id).copied();
            view! {
                <tr>
                    <td>{goal.title}</td>
                    <td>{format!("{}%", goal.weight)}</td>
                    <td><ScoreSelect goal_id=goal.id current=current locked=locked raw=raw /></td>
                </tr>
            }
        })
        .collect_view();
    let actions = (!locked).then(|| {
        view! {
            <button type="button" class="btn" on:click=move |_| save(false)>
                "Save draft"
            </button>
            <button type="button" class="btn btn--primary" on:click=move |_| save(true)>
                "Submit"
            </button>
        }
    });

    view! {
        <p class="page__lead">
            {format!("Period {} ", sheet.period)}
            <Badge label=status />
        </p>
        <div class="form">
            <DataTable headers=&["Goal", "Weight", "Score"]>{rows}</DataTable>
            <label>
                "Comment"
                <textarea
                    rows="4"
                    disabled=locked
                    prop:value=move || comment.get()
                    on:input=move |ev| comment.set(event_target_value(&ev))
                >
                    {comment_text}
                </textarea>
            </label>
            <p>"Weighted score: " <strong>{live_score}</strong></p>
            {actions}
            <FormMessage message=message />
        </div>
    }
}

#[component]
fn MemberList(members: Vec<UserRecord>) -> impl IntoView {
    if members.is_empty() {
        return view! { <EmptyState message="There is nobody to evaluate yet." /> }.into_any();
    }
    let rows = members
        .into_iter()
        .map(|u| {
            let href = format!("/evaluation-form?target={}", urlencoding::encode(&u.id));
            let name = u.name().to_owned();
            view! {
                <tr>
                    <td>{name}</td>
                    <td><Badge label=u.role.label() /></td>
                    <td><AppLink href=href>"Evaluate"</AppLink></td>
                </tr>
            }
        })
        .collect_view();
    view! { <DataTable headers=&["Name", "Role", ""]>{rows}</DataTable> }.into_any()
}

/// Members `session` may evaluate.
fn evaluable_members(session: &Session, members: Vec<UserRecord>) -> Vec<UserRecord> {
    members
        .into_iter()
        .filter(|u| u.id != session.uid && u.role != Role::Developer)
        .collect()
}

pub struct EvaluationFormPage {
    ctx: AppContext,
}

impl EvaluationFormPage {
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }
}

#[async_trait(?Send)]
impl Page for EvaluationFormPage {
    async fn render(&mut self, request: &PageRequest) -> Result<PageView, PageError> {
        let session = require_role(&self.ctx, REVIEWERS)?;
        let store = self.ctx.store();

        let Some(target) = request.param("target") else {
            let members: Vec<UserRecord> =
                query_records(store.as_ref(), Collection::Users, &[Filter::eq("tenantId", session.tenant())]).await?;
            let members = evaluable_members(&session, members);
            return Ok(PageView::new(move || {
                view! {
                    <PageFrame class="evaluation-form" title="Evaluate">
                        <p class="page__lead">"Choose who to evaluate."</p>
                        <MemberList members=members />
                    </PageFrame>
                }
            }));
        };

        let user = match evaluable(store.as_ref(), &session, target).await {
            Ok(user) => user,
            Err(message) => {
                return Ok(PageView::new(move || {
                    view! {
                        <PageFrame class="evaluation-form" title="Evaluate">
                            <ErrorPanel title="Cannot evaluate" message=message />
                        </PageFrame>
                    }
                }));
            }
        };
        let goals = approved_goals(store.as_ref(), target).await?;
        let period = period_label(now_ms());
        let previous = existing(store.as_ref(), &session.uid, target, &period).await?;
        let title = format!("Evaluate {}", user.name());
        let sheet = ScoreSheet { target: target.to_owned(), period, goals, previous };

        let ctx = self.ctx.clone();
        Ok(PageView::new(move || {
            let body = if sheet.goals.is_empty() {
                view! {
                    <p class="page__lead">{format!("Period {}", sheet.period)}</p>
                    <EmptyState message="This person has no approved goals yet." />
                }
                .into_any()
            } else {
                view! { <ScoreForm ctx=ctx sheet=sheet /> }.into_any()
            };
            view! { <PageFrame class="evaluation-form" title=title>{body}</PageFrame> }
        }))
    }
}
