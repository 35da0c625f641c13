//! Role-specific landing page.

use async_trait::async_trait;
use leptos::prelude::*;
use schema::{Collection, Evaluation, Goal, GoalStatus, Role, Tenant, UserRecord};

use super::{Page, PageError, PageRequest, PageView, require_session};
use crate::app::AppContext;
use crate::auth::Session;
use crate::components::page_frame::{AppLink, Badge, PageFrame};
use crate::net::store::{DataStore, Filter, query_records};

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

/// One summary card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub title: &'static str,
    pub value: String,
    pub href: &'static str,
    pub action: &'static str,
}

impl Card {
    fn new(title: &'static str, value: impl ToString, href: &'static str, action: &'static str) -> Self {
        Self { title, value: value.to_string(), href, action }
    }

}

#[component]
fn SummaryCard(card: Card) -> impl IntoView {
    view! {
        <article class="card">
            <h2 class="card__title">{card.title}</h2>
            <p class="card__value">{card.value}</p>
            <AppLink href=card.href>{card.action}</AppLink>
        </article>
    }
}

/// Summary cards for `session`.
///
/// # Errors
///
/// Store failures.
pub async fn cards(store: &dyn DataStore, session: &Session) -> Result<Vec<Card>, PageError> {
    let tenant = Filter::eq("tenantId", session.tenant());
    let cards = match session.role {
        Role::Developer => {
            let tenants: Vec<Tenant> = query_records(store, Collection::Tenants, &[]).await?;
            vec![Card::new("Organizations", tenants.len(), "/developer", "Manage organizations")]
        }
        Role::Admin => {
            let users: Vec<UserRecord> = query_records(store, Collection::Users, &[tenant.clone()]).await?;
            let pending: Vec<Goal> =
                query_records(store, Collection::Goals, &[tenant.clone(), Filter::eq("status", GoalStatus::Pending.as_str())]).await?;
            let evaluations: Vec<Evaluation> = query_records(store, Collection::Evaluations, &[tenant]).await?;
            vec![
                Card::new("Users", users.len(), "/users", "Manage users"),
                Card::new("Goals awaiting approval", pending.len(), "/goal-approvals", "Review goals"),
                Card::new("Evaluations", evaluations.len(), "/evaluations", "View evaluations"),
            ]
        }
        Role::Evaluator => {
            let pending: Vec<Goal> =
                query_records(store, Collection::Goals, &[tenant, Filter::eq("status", GoalStatus::Pending.as_str())]).await?;
            let authored: Vec<Evaluation> =
                query_records(store, Collection::Evaluations, &[Filter::eq("evaluatorId", session.uid.as_str())]).await?;
            vec![
                Card::new("Goals awaiting approval", pending.len(), "/goal-approvals", "Review goals"),
                Card::new("Evaluations written", authored.len(), "/evaluation-form", "Evaluate someone"),
                Card::new("My goals", "", "/goal-setting", "Set goals"),
            ]
        }
        Role::Worker => {
            let goals: Vec<Goal> = query_records(store, Collection::Goals, &[Filter::eq("userId", session.uid.as_str())]).await?;
            let weight: u32 = goals.iter().filter(|g| g.status != GoalStatus::Rejected).map(|g| g.weight).sum();
            let about_me: Vec<Evaluation> =
                query_records(store, Collection::Evaluations, &[Filter::eq("targetUserId", session.uid.as_str())]).await?;
            vec![
                Card::new("My goals", format!("{} ({weight}% weighted)", goals.len()), "/goal-setting", "Set goals"),
                Card::new("My evaluations", about_me.len(), "/evaluations", "View evaluations"),
            ]
        }
    };
    Ok(cards)
}

pub struct DashboardPage {
    ctx: AppContext,
}

impl DashboardPage {
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }
}

#[async_trait(?Send)]
impl Page for DashboardPage {
    async fn render(&mut self, _request: &PageRequest) -> Result<PageView, PageError> {
        let session = require_session(&self.ctx)?;
        let store = self.ctx.store();
        let cards = cards(store.as_ref(), &session).await?;
        let demo = self.ctx.is_demo();
        let name = session.name().to_owned();
        let role = session.role.label();

        Ok(PageView::new(move || {
            view! {
                <PageFrame class="dashboard" title="Dashboard">
                    <p class="page__lead">"Welcome, " {name} ". " <Badge label=role /></p>
                    {demo
                        .then(|| {
                            view! {
                                <p class="notice">
                                    "Demo mode: changes are kept in memory and lost on reload."
                                </p>
                            }
                        })}
                    <div class="card-grid">
                        {cards.into_iter().map(|card| view! { <SummaryCard card=card /> }).collect_view()}
                    </div>
                </PageFrame>
            }
        }))
    }
}
