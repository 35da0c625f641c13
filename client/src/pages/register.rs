//! `/register?token=...`: join an organization by invitation.

use async_trait::async_trait;

use super::registration::{self, RegistrationKind};
use super::{Page, PageError, PageRequest, PageView};
use crate::app::AppContext;

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

pub struct RegisterPage {
    ctx: AppContext,
}

impl RegisterPage {
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }
}

#[async_trait(?Send)]
impl Page for RegisterPage {
    async fn render(&mut self, request: &PageRequest) -> Result<PageView, PageError> {
        Ok(registration::render_page(&self.ctx, request, RegistrationKind::Member).await)
    }
}
