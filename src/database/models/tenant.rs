use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Subscription tier. Determines the mocked monthly price and the default
/// student capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tenant_plan", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TenantPlan {
    Free,
    Pro,
    Enterprise,
}

impl TenantPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantPlan::Free => "free",
            TenantPlan::Pro => "pro",
            TenantPlan::Enterprise => "enterprise",
        }
    }

    /// Default student capacity when a create request does not set one.
    pub fn default_student_limit(&self) -> i32 {
        match self {
            TenantPlan::Free => 50,
            TenantPlan::Pro => 200,
            TenantPlan::Enterprise => 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tenant_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Inactive,
    Suspended,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Active => "active",
            TenantStatus::Inactive => "inactive",
            TenantStatus::Suspended => "suspended",
        }
    }
}

/// A school account row, one per subdomain.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub subdomain: String,
    pub plan: TenantPlan,
    pub status: TenantStatus,
    pub admin_email: String,
    pub max_students: i32,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing row: the tenant columns the console table shows, plus the live
/// occupancy count computed per row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TenantSummary {
    pub id: Uuid,
    pub name: String,
    pub subdomain: String,
    pub plan: TenantPlan,
    pub status: TenantStatus,
    pub admin_email: String,
    pub max_students: i32,
    pub student_count: i64,
    pub created_at: DateTime<Utc>,
}
