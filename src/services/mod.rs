pub mod pricing;
pub mod stats_service;
pub mod tenant_service;
pub mod view_cache;

pub use pricing::{MockPricing, PricingPolicy};
pub use stats_service::{DashboardStats, StatsService};
pub use tenant_service::{
    CreateTenant, TenantChanges, TenantDetail, TenantError, TenantListQuery, TenantPage,
    TenantService,
};
pub use view_cache::ViewCache;
