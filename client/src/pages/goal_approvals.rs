//! Pending goals of the tenant, approved or rejected by evaluators and admins.

use std::collections::HashMap;

use async_trait::async_trait;
use leptos::prelude::*;
use schema::{Collection, Goal, GoalStatus, UserRecord};
use serde_json::json;

use super::{Page, PageError, PageRequest, PageView, require_role};
use crate::app::AppContext;
use crate::components::page_frame::{DataTable, EmptyState, FormMessage, PageFrame};
use crate::net::store::{Filter, fields, get_record, query_records};
use crate::router::REVIEWERS;
use crate::util::task::spawn_local;

#[cfg(test)]
#[path = "goal_approvals_test.rs"]
mod goal_approvals_test;

/// Approve or reject a pending goal in the reviewer's tenant.
///
/// # Errors
///
/// Permission, state and store failures as user-facing messages.
pub async fn decide(ctx: &AppContext, goal_id: &str, approve: bool) -> Result<GoalStatus, String> {
    let session = require_role(ctx, REVIEWERS).map_err(|e| e.to_string())?;
    let store = ctx.store();
    let goal = get_record::<Goal>(store.as_ref(), Collection::Goals, goal_id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "That goal no longer exists.".to_owned())?;
    if goal.tenant_id != session.tenant() {
        return Err(PageError::Forbidden.to_string());
    }
    if goal.user_id == session.uid {
        return Err("You cannot review your own goal.".to_owned());
    }
    if goal.status != GoalStatus::Pending {
        return Err("This goal is no longer waiting for review.".to_owned());
    }

    let status = if approve { GoalStatus::Approved } else { GoalStatus::Rejected };
    store
        .update(
            Collection::Goals,
            goal_id,
            fields([("status", json!(status.as_str())), ("approverId", json!(session.uid))]),
        )
        .await
        .map_err(|e| e.to_string())?;
    log::info!("goals: {} marked {goal_id} {}", session.uid, status.as_str());
    Ok(status)
}

/// A pending goal as listed, with its owner's name resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingGoal {
    pub goal_id: String,
    pub owner: String,
    pub title: String,
    pub weight: u32,
    /// False for the reviewer's own goals.
    pub reviewable: bool,
}

#[component]
fn ApprovalList(ctx: AppContext, pending: Vec<PendingGoal>) -> impl IntoView {
    let ctx = StoredValue::new_local(ctx);
    let message = RwSignal::new(String::new());
    let review = move |goal_id: String, approve: bool| {
        let ctx = ctx.get_value();
        spawn_local(async move {
            match decide(&ctx, &goal_id, approve).await {
                Ok(_) => ctx.navigator().refresh(),
                Err(text) => message.set(text),
            }
        });
    };

    let list = if pending.is_empty() {
        view! { <EmptyState message="No goals are waiting for approval." /> }.into_any()
    } else {
        let rows = pending
            .into_iter()
            .map(|goal| {
                let actions = goal.reviewable.then(|| {
                    let approve_id = goal.goal_id.clone();
                    let reject_id = goal.goal_id.clone();
                    view! {
                        <button
                            type="button"
                            class="btn btn--small"
                            data-id=goal.goal_id.clone()
                            on:click=move |_| review(approve_id.clone(), true)
                        >
                            "Approve"
                        </button>
                        <button
                            type="button"
                            class="btn btn--small btn--ghost"
                            on:click=move |_| review(reject_id.clone(), false)
                        >
                            "Reject"
                        </button>
                    }
                });
                view! {
                    <tr>
                        <td>{goal.owner}</td>
                        <td>{goal.title}</td>
                        <td>{format!("{}%", goal.weight)}</td>
                        <td>{actions}</td>
                    </tr>
                }
            })
            .collect_view();
        view! { <DataTable headers=&["Owner", "Goal", "Weight", ""]>{rows}</DataTable> }.into_any()
    };

    view! {
        {list}
        <FormMessage message=message />
    }
}

pub struct GoalApprovalsPage {
    ctx: AppContext,
}

impl GoalApprovalsPage {
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }
}

#[async_trait(?Send)]
impl Page for GoalApprovalsPage {
    async fn render(&mut self, _request: &PageRequest) -> Result<PageView, PageError> {
        let session = require_role(&self.ctx, REVIEWERS)?;
        let store = self.ctx.store();
        let tenant = Filter::eq("tenantId", session.tenant());
        let goals: Vec<Goal> = query_records(
            store.as_ref(),
            Collection::Goals,
            &[tenant.clone(), Filter::eq("status", GoalStatus::Pending.as_str())],
        )
        .await?;
        let names: HashMap<String, String> = query_records::<UserRecord>(store.as_ref(), Collection::Users, &[tenant])
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u.name().to_owned()))
            .collect();
        let pending: Vec<PendingGoal> = goals
            .into_iter()
            .map(|goal| PendingGoal {
                owner: names.get(&goal.user_id).cloned().unwrap_or_else(|| goal.user_id.clone()),
                reviewable: goal.user_id != session.uid,
                goal_id: goal.id,
                title: goal.title,
                weight: goal.weight,
            })
            .collect();

        let ctx = self.ctx.clone();
        Ok(PageView::new(move || {
            let body = view! { <ApprovalList ctx=ctx pending=pending /> };
            view! { <PageFrame class="goal-approvals" title="Goal approvals">{body}</PageFrame> }
        }))
    }
}
