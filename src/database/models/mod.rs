pub mod activity;
pub mod tenant;

pub use activity::{ActivityAction, ActivityLogEntry};
pub use tenant::{Tenant, TenantPlan, TenantStatus, TenantSummary};
