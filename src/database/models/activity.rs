use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle event tags written to the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
    TenantCreated,
    TenantUpdated,
    TenantDeleted,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::TenantCreated => "TENANT_CREATED",
            ActivityAction::TenantUpdated => "TENANT_UPDATED",
            ActivityAction::TenantDeleted => "TENANT_DELETED",
        }
    }
}

/// One append-only audit row. Entries are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityLogEntry {
    pub id: i64,
    pub tenant_id: Uuid,
    pub action: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
