use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseManager;
use crate::database::models::{TenantPlan, TenantStatus};
use crate::services::pricing::{MockPricing, PricingPolicy};
use crate::services::tenant_service::TenantError;

#[derive(Debug, Serialize, FromRow)]
pub struct PlanCount {
    pub plan: TenantPlan,
    pub count: i64,
}

#[derive(Debug, Serialize, FromRow)]
struct StatusCount {
    status: TenantStatus,
    count: i64,
}

#[derive(Debug, Serialize)]
pub struct PlanRevenue {
    pub plan: TenantPlan,
    pub count: i64,
    pub revenue: i64,
}

/// Read-only dashboard aggregates. Soft-deleted tenants are excluded from
/// every figure. Revenue is a mocked rollup from the pricing policy, not a
/// billing ledger.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_tenants: i64,
    pub active_tenants: i64,
    /// True status = inactive count.
    pub inactive_tenants: i64,
    pub suspended_tenants: i64,
    /// Legacy derived figure (total - active); folds suspended tenants in.
    /// Kept alongside the true counts so consumers can pick.
    pub not_active_tenants: i64,
    pub plan_distribution: Vec<PlanCount>,
    pub recent_signups: i64,
    pub revenue_by_plan: Vec<PlanRevenue>,
    pub total_revenue: i64,
}

pub struct StatsService {
    pool: PgPool,
    pricing: Box<dyn PricingPolicy>,
}

impl StatsService {
    pub async fn new() -> Result<Self, TenantError> {
        let pool = DatabaseManager::main_pool().await?;
        Ok(Self {
            pool,
            pricing: Box::new(MockPricing),
        })
    }

    pub fn with_pricing(pool: PgPool, pricing: Box<dyn PricingPolicy>) -> Self {
        Self { pool, pricing }
    }

    /// Pure read aggregation; no side effects.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, TenantError> {
        let status_counts = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM tenants WHERE is_deleted = false GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        let total_tenants: i64 = status_counts.iter().map(|s| s.count).sum();
        let count_for = |status: TenantStatus| {
            status_counts
                .iter()
                .find(|s| s.status == status)
                .map(|s| s.count)
                .unwrap_or(0)
        };
        let active_tenants = count_for(TenantStatus::Active);

        let plan_distribution = sqlx::query_as::<_, PlanCount>(
            "SELECT plan, COUNT(*) AS count FROM tenants WHERE is_deleted = false GROUP BY plan",
        )
        .fetch_all(&self.pool)
        .await?;

        let thirty_days_ago = Utc::now() - Duration::days(30);
        let recent_signups: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tenants WHERE is_deleted = false AND created_at >= $1",
        )
        .bind(thirty_days_ago)
        .fetch_one(&self.pool)
        .await?;

        let (revenue_by_plan, total_revenue) =
            revenue_rollup(&plan_distribution, self.pricing.as_ref());

        Ok(DashboardStats {
            total_tenants,
            active_tenants,
            inactive_tenants: count_for(TenantStatus::Inactive),
            suspended_tenants: count_for(TenantStatus::Suspended),
            not_active_tenants: total_tenants - active_tenants,
            plan_distribution,
            recent_signups,
            revenue_by_plan,
            total_revenue,
        })
    }
}

/// Fold the plan distribution through the pricing policy.
pub fn revenue_rollup(
    distribution: &[PlanCount],
    pricing: &dyn PricingPolicy,
) -> (Vec<PlanRevenue>, i64) {
    let revenue_by_plan: Vec<PlanRevenue> = distribution
        .iter()
        .map(|p| PlanRevenue {
            plan: p.plan,
            count: p.count,
            revenue: p.count * pricing.monthly_price(p.plan),
        })
        .collect();
    let total_revenue = revenue_by_plan.iter().map(|p| p.revenue).sum();
    (revenue_by_plan, total_revenue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revenue_for_mixed_plans() {
        let distribution = vec![
            PlanCount {
                plan: TenantPlan::Free,
                count: 3,
            },
            PlanCount {
                plan: TenantPlan::Pro,
                count: 2,
            },
            PlanCount {
                plan: TenantPlan::Enterprise,
                count: 1,
            },
        ];

        let (by_plan, total) = revenue_rollup(&distribution, &MockPricing);

        assert_eq!(total, 297);
        assert_eq!(by_plan.len(), 3);
        assert_eq!(by_plan[0].revenue, 0);
        assert_eq!(by_plan[1].revenue, 98);
        assert_eq!(by_plan[2].revenue, 199);
        assert_eq!(by_plan.iter().map(|p| p.count).sum::<i64>(), 6);
    }

    #[test]
    fn revenue_for_empty_distribution() {
        let (by_plan, total) = revenue_rollup(&[], &MockPricing);
        assert!(by_plan.is_empty());
        assert_eq!(total, 0);
    }
}
