use crate::database::models::TenantPlan;

/// Monthly price source for the revenue rollup. The dashboard only needs a
/// figure per plan; a real billing integration can supply a live policy
/// without touching the aggregation queries.
pub trait PricingPolicy: Send + Sync {
    /// Monthly price in whole USD for one tenant on the given plan.
    fn monthly_price(&self, plan: TenantPlan) -> i64;
}

/// Fixed price table used for the mocked revenue figure. Not tied to any
/// billing ledger.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockPricing;

impl PricingPolicy for MockPricing {
    fn monthly_price(&self, plan: TenantPlan) -> i64 {
        match plan {
            TenantPlan::Free => 0,
            TenantPlan::Pro => 49,
            TenantPlan::Enterprise => 199,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_price_table() {
        let pricing = MockPricing;
        assert_eq!(pricing.monthly_price(TenantPlan::Free), 0);
        assert_eq!(pricing.monthly_price(TenantPlan::Pro), 49);
        assert_eq!(pricing.monthly_price(TenantPlan::Enterprise), 199);
    }
}
