//! Own goals: list, add, submit drafts for approval.
//!
//! DESIGN
//! ======
//! Goal weights are percentages of the period. Rejected goals do not count
//! toward the total, which may never exceed 100. New goals start as drafts
//! and become `pending` when submitted.

use async_trait::async_trait;
use leptos::prelude::*;
use schema::{Collection, Goal, GoalStatus};
use serde_json::json;

use super::{Page, PageError, PageRequest, PageView, require_role};
use crate::app::AppContext;
use crate::components::page_frame::{Badge, DataTable, EmptyState, FormMessage, PageFrame};
use crate::net::store::{DataStore, Filter, add_record, fields, get_record, query_records};
use crate::router::GOAL_OWNERS;
use crate::util::task::spawn_local;

#[cfg(test)]
#[path = "goal_setting_test.rs"]
mod goal_setting_test;

pub const MAX_TOTAL_WEIGHT: u32 = 100;

/// Weight already committed by goals that still count.
#[must_use]
pub fn committed_weight(goals: &[Goal]) -> u32 {
    goals.iter().filter(|g| g.status != GoalStatus::Rejected).map(|g| g.weight).sum()
}

/// Check that `weight` fits next to `goals`.
///
/// # Errors
///
/// A user-facing message when the weight is out of range or would push the
/// total past 100.
pub fn check_weight(goals: &[Goal], weight: u32) -> Result<(), String> {
    if !(1..=MAX_TOTAL_WEIGHT).contains(&weight) {
        return Err("Weight must be between 1 and 100.".to_owned());
    }
    let committed = committed_weight(goals);
    if committed + weight > MAX_TOTAL_WEIGHT {
        return Err(format!(
            "Total weight would be {}%. Only {}% remains.",
            committed + weight,
            MAX_TOTAL_WEIGHT.saturating_sub(committed)
        ));
    }
    Ok(())
}

/// Parse the weight field.
///
/// # Errors
///
/// A user-facing message for anything but a whole number.
pub fn parse_weight(raw: &str) -> Result<u32, &'static str> {
    raw.trim().parse::<u32>().map_err(|_| "Weight must be a whole number.")
}

/// Goals owned by `uid`.
///
/// # Errors
///
/// Store failures.
pub async fn own_goals(store: &dyn DataStore, uid: &str) -> Result<Vec<Goal>, PageError> {
    let mut goals: Vec<Goal> = query_records(store, Collection::Goals, &[Filter::eq("userId", uid)]).await?;
    goals.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(goals)
}

/// Add a draft goal for the signed-in user and return its id.
///
/// # Errors
///
/// Validation and store failures as user-facing messages.
pub async fn add_goal(ctx: &AppContext, title: &str, description: &str, weight: u32) -> Result<String, String> {
    let session = require_role(ctx, GOAL_OWNERS).map_err(|e| e.to_string())?;
    let title = title.trim();
    if title.is_empty() {
        return Err("Enter a goal title.".to_owned());
    }
    let store = ctx.store();
    let goals = own_goals(store.as_ref(), &session.uid).await.map_err(|e| e.to_string())?;
    check_weight(&goals, weight)?;

    let goal = Goal {
        id: String::new(),
        tenant_id: session.tenant().to_owned(),
        user_id: session.uid.clone(),
        title: title.to_owned(),
        description: description.trim().to_owned(),
        weight,
        status: GoalStatus::Draft,
        approver_id: None,
    };
    add_record(store.as_ref(), Collection::Goals, &goal)
        .await
        .map_err(|e| format!("Could not save the goal: {e}"))
}

/// Move one of the signed-in user's drafts (or rejected goals) to `pending`.
///
/// # Errors
///
/// Ownership, state and store failures as user-facing messages.
pub async fn submit_goal(ctx: &AppContext, goal_id: &str) -> Result<(), String> {
    let session = require_role(ctx, GOAL_OWNERS).map_err(|e| e.to_string())?;
    let store = ctx.store();
    let goal = get_record::<Goal>(store.as_ref(), Collection::Goals, goal_id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "That goal no longer exists.".to_owned())?;
    if goal.user_id != session.uid {
        return Err(PageError::Forbidden.to_string());
    }
    if !matches!(goal.status, GoalStatus::Draft | GoalStatus::Rejected) {
        return Err("Only drafts can be submitted.".to_owned());
    }
    if goal.status == GoalStatus::Rejected {
        let others: Vec<Goal> = own_goals(store.as_ref(), &session.uid)
            .await
            .map_err(|e| e.to_string())?
            .into_iter()
            .filter(|g| g.id != goal.id)
            .collect();
        check_weight(&others, goal.weight)?;
    }
    store
        .update(Collection::Goals, goal_id, fields([("status", json!(GoalStatus::Pending.as_str()))]))
        .await
        .map_err(|e| e.to_string())
}

/// Label of the row action, if the goal can still be submitted.
fn submit_label(status: GoalStatus) -> Option<&'static str> {
    match status {
        GoalStatus::Draft => Some("Submit for approval"),
        GoalStatus::Rejected => Some("Resubmit"),
        GoalStatus::Pending | GoalStatus::Approved => None,
    }
}

#[component]
fn GoalSetting(ctx: AppContext, goals: Vec<Goal>) -> impl IntoView {
    let committed = committed_weight(&goals);
    let remaining = MAX_TOTAL_WEIGHT.saturating_sub(committed);
    let ctx = StoredValue::new_local(ctx);
    let title = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());
    let weight = RwSignal::new(remaining.to_string());
    let message = RwSignal::new(String::new());

    let submit_for_approval = move |goal_id: String| {
        let ctx = ctx.get_value();
        spawn_local(async move {
            match submit_goal(&ctx, &goal_id).await {
                Ok(()) => ctx.navigator().refresh(),
                Err(text) => message.set(text),
            }
        });
    };

    let on_add = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let weight = match parse_weight(&weight.get_untracked()) {
            Ok(weight) => weight,
            Err(text) => {
                message.set(text.to_owned());
                return;
            }
        };
        let ctx = ctx.get_value();
        let title = title.get_untracked();
        let description = description.get_untracked();
        spawn_local(async move {
            match add_goal(&ctx, &title, &description, weight).await {
                Ok(_) => ctx.navigator().refresh(),
                Err(text) => message.set(text),
            }
        });
    };

    let list = if goals.is_empty() {
        view! { <EmptyState message="You have not set any goals yet." /> }.into_any()
    } else {
        let rows = goals
            .into_iter()
            .map(|goal| {
                let action = submit_label(goal.status).map(|label| {
                    let goal_id = goal.id.clone();
                    view! {
                        <button
                            type="button"
                            class="btn btn--small"
                            data-id=goal_id.clone()
                            on:click=move |_| submit_for_approval(goal_id.clone())
                        >
                            {label}
                        </button>
                    }
                });
                view! {
                    <tr>
                        <td>{goal.title}</td>
                        <td>{goal.description}</td>
                        <td>{format!("{}%", goal.weight)}</td>
                        <td><Badge label=goal.status.as_str() /></td>
                        <td>{action}</td>
                    </tr>
                }
            })
            .collect_view();
        view! { <DataTable headers=&["Goal", "Description", "Weight", "Status", ""]>{rows}</DataTable> }.into_any()
    };

    view! {
        <p class="page__lead">
            "Total weight: " <strong>{format!("{committed}%")}</strong> {format!(" of {MAX_TOTAL_WEIGHT}%")}
        </p>
        {list}
        <h2>"Add a goal"</h2>
        <form class="form" novalidate on:submit=on_add>
            <label>
                "Title"
                <input
                    type="text"
                    required
                    prop:value=move || title.get()
                    on:input=move |ev| title.set(event_target_value(&ev))
                />
            </label>
            <label>
                "Description"
                <textarea
                    rows="3"
                    prop:value=move || description.get()
                    on:input=move |ev| description.set(event_target_value(&ev))
                ></textarea>
            </label>
            <label>
                "Weight (%)"
                <input
                    type="number"
                    min="1"
                    max=remaining.to_string()
                    value=remaining.to_string()
                    on:input=move |ev| weight.set(event_target_value(&ev))
                />
            </label>
            <button type="submit" class="btn btn--primary">"Add goal"</button>
            <FormMessage message=message />
        </form>
    }
}

pub struct GoalSettingPage {
    ctx: AppContext,
}

impl GoalSettingPage {
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }
}

#[async_trait(?Send)]
impl Page for GoalSettingPage {
    async fn render(&mut self, _request: &PageRequest) -> Result<PageView, PageError> {
        let session = require_role(&self.ctx, GOAL_OWNERS)?;
        let store = self.ctx.store();
        let goals = own_goals(store.as_ref(), &session.uid).await?;
        let ctx = self.ctx.clone();
        Ok(PageView::new(move || {
            let body = view! { <GoalSetting ctx=ctx goals=goals /> };
            view! { <PageFrame class="goal-setting" title="My goals">{body}</PageFrame> }
        }))
    }
}
