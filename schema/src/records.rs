//! Stored document types.
//!
//! Field names are camelCase on the wire. The document id is not part of the
//! stored fields: stores inject it as `id` when reading, and it is skipped when
//! writing.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// COLLECTIONS
// =============================================================================

/// Top-level collections of the document database.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Tenants,
    Invitations,
    Goals,
    Evaluations,
}

impl Collection {
    pub const ALL: [Self; 5] = [Self::Users, Self::Tenants, Self::Invitations, Self::Goals, Self::Evaluations];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Tenants => "tenants",
            Self::Invitations => "invitations",
            Self::Goals => "goals",
            Self::Evaluations => "evaluations",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == raw)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ROLES & STATUS
// =============================================================================

/// Caller role. Drives route access on the client and the backend policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Developer,
    Admin,
    Evaluator,
    Worker,
}

impl Role {
    pub const ALL: [Self; 4] = [Self::Developer, Self::Admin, Self::Evaluator, Self::Worker];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Developer => "developer",
            Self::Admin => "admin",
            Self::Evaluator => "evaluator",
            Self::Worker => "worker",
        }
    }

    /// Human-readable label for tables and badges.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Developer => "Developer",
            Self::Admin => "Administrator",
            Self::Evaluator => "Evaluator",
            Self::Worker => "Worker",
        }
    }

    /// Case-insensitive parse.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|r| r.as_str().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account lifecycle status. Documents written before the field existed read
/// as `Active`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Pending,
    Inactive,
}

impl UserStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Inactive => "inactive",
        }
    }
}

// =============================================================================
// USERS & TENANTS
// =============================================================================

/// `users/{uid}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl UserRecord {
    /// Display name, or the email when no name was given.
    #[must_use]
    pub fn name(&self) -> &str {
        if self.display_name.trim().is_empty() { &self.email } else { &self.display_name }
    }
}

/// `tenants/{id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// INVITATIONS
// =============================================================================

/// `invitations/{token}`. The document id is the invitation token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub email: String,
    pub role: Role,
    pub tenant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
    #[serde(default)]
    pub used: bool,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Invitation {
    /// Unused and not past its expiry at `now_ms`.
    #[must_use]
    pub fn is_usable(&self, now_ms: i64) -> bool {
        !self.used && self.expires_at.is_none_or(|expires| now_ms < expires)
    }
}

// =============================================================================
// GOALS & EVALUATIONS
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl GoalStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// `goals/{id}`. `weight` is a percentage of the period's total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub tenant_id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub weight: u32,
    #[serde(default)]
    pub status: GoalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver_id: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStatus {
    #[default]
    Draft,
    Submitted,
}

/// `evaluations/{id}`. `scores` maps goal id to a 1-5 rating.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub tenant_id: String,
    pub target_user_id: String,
    pub evaluator_id: String,
    pub period: String,
    #[serde(default)]
    pub scores: BTreeMap<String, u8>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub total_score: f64,
    #[serde(default)]
    pub status: EvaluationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

#[cfg(test)]
#[path = "records_test.rs"]
mod tests;
