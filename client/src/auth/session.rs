//! The signed-in user as seen by the router and pages.

use schema::{Role, UserRecord, UserStatus};
use serde::{Deserialize, Serialize};

/// Created at login, read by the auth gate, destroyed at logout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    pub role: Role,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub status: UserStatus,
    /// Issued by the fallback provider rather than the identity service.
    #[serde(default)]
    pub is_temp: bool,
}

impl Session {
    #[must_use]
    pub fn from_record(uid: &str, record: &UserRecord, is_temp: bool) -> Self {
        Self {
            uid: uid.to_owned(),
            email: record.email.clone(),
            display_name: record.display_name.clone(),
            role: record.role,
            tenant_id: record.tenant_id.clone(),
            status: record.status,
            is_temp,
        }
    }

    /// Display name, or the email when no name was given.
    #[must_use]
    pub fn name(&self) -> &str {
        if self.display_name.trim().is_empty() { &self.email } else { &self.display_name }
    }

    #[must_use]
    pub fn has_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    /// Tenant id, or empty for tenant-less accounts (developers).
    #[must_use]
    pub fn tenant(&self) -> &str {
        self.tenant_id.as_deref().unwrap_or_default()
    }
}
