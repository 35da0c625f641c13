//! `/register-admin?token=...`: set up a new organization from an admin
//! invitation issued on the developer page.

use async_trait::async_trait;

use super::registration::{self, RegistrationKind};
use super::{Page, PageError, PageRequest, PageView};
use crate::app::AppContext;

pub struct RegisterAdminPage {
    ctx: AppContext,
}

impl RegisterAdminPage {
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }
}

#[async_trait(?Send)]
impl Page for RegisterAdminPage {
    async fn render(&mut self, request: &PageRequest) -> Result<PageView, PageError> {
        Ok(registration::render_page(&self.ctx, request, RegistrationKind::OrganizationAdmin).await)
    }
}
