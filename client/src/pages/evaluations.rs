//! Evaluations visible to the signed-in role.

use std::collections::HashMap;

use async_trait::async_trait;
use leptos::prelude::*;
use schema::{Collection, Evaluation, EvaluationStatus, Role, UserRecord};

use super::{Page, PageError, PageRequest, PageView, require_session};
use crate::app::AppContext;
use crate::auth::Session;
use crate::components::page_frame::{Badge, DataTable, EmptyState, PageFrame};
use crate::net::store::{DataStore, Filter, query_records};

#[cfg(test)]
#[path = "evaluations_test.rs"]
mod evaluations_test;

/// Workers see evaluations about them, evaluators the ones they wrote,
/// admins and developers the whole tenant.
#[must_use]
pub fn visibility_filters(session: &Session) -> Vec<Filter> {
    match session.role {
        Role::Worker => vec![Filter::eq("targetUserId", session.uid.as_str())],
        Role::Evaluator => vec![Filter::eq("evaluatorId", session.uid.as_str())],
        Role::Admin | Role::Developer => vec![Filter::eq("tenantId", session.tenant())],
    }
}

/// # Errors
///
/// Store failures.
pub async fn visible_evaluations(store: &dyn DataStore, session: &Session) -> Result<Vec<Evaluation>, PageError> {
    let mut found: Vec<Evaluation> = query_records(store, Collection::Evaluations, &visibility_filters(session)).await?;
    // Workers only see finished evaluations of themselves.
    if session.role == Role::Worker {
        found.retain(|e| e.status == EvaluationStatus::Submitted);
    }
    found.sort_by(|a, b| b.period.cmp(&a.period).then_with(|| a.id.cmp(&b.id)));
    Ok(found)
}

pub struct EvaluationsPage {
    ctx: AppContext,
}

impl EvaluationsPage {
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }
}

#[async_trait(?Send)]
impl Page for EvaluationsPage {
    async fn render(&mut self, _request: &PageRequest) -> Result<PageView, PageError> {
        let session = require_session(&self.ctx)?;
        let store = self.ctx.store();
        let evaluations = visible_evaluations(store.as_ref(), &session).await?;
        if evaluations.is_empty() {
            return Ok(PageView::new(|| {
                view! {
                    <PageFrame class="evaluations" title="Evaluations">
                        <EmptyState message="No evaluations to show." />
                    </PageFrame>
                }
            }));
        }

        let names: HashMap<String, String> =
            query_records::<UserRecord>(store.as_ref(), Collection::Users, &[Filter::eq("tenantId", session.tenant())])
                .await?
                .into_iter()
                .map(|u| (u.id.clone(), u.name().to_owned()))
                .collect();

        Ok(PageView::new(move || {
            let name = |uid: &str| names.get(uid).cloned().unwrap_or_else(|| uid.to_owned());
            let rows = evaluations
                .into_iter()
                .map(|e| {
                    let status = match e.status {
                        EvaluationStatus::Draft => "draft",
                        EvaluationStatus::Submitted => "submitted",
                    };
                    view! {
                        <tr>
                            <td>{e.period}</td>
                            <td>{name(&e.target_user_id)}</td>
                            <td>{name(&e.evaluator_id)}</td>
                            <td>{format!("{:.2}", e.total_score)}</td>
                            <td><Badge label=status /></td>
                            <td>{e.comment}</td>
                        </tr>
                    }
                })
                .collect_view();
            view! {
                <PageFrame class="evaluations" title="Evaluations">
                    <DataTable headers=&["Period", "Person", "Evaluator", "Score", "Status", "Comment"]>
                        {rows}
                    </DataTable>
                </PageFrame>
            }
        }))
    }
}
