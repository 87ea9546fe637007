// GET /api/admin/stats - dashboard aggregates

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{DashboardStats, StatsService};

pub async fn dashboard_stats() -> ApiResult<DashboardStats> {
    let service = StatsService::new().await?;
    let stats = service.dashboard_stats().await?;
    Ok(ApiResponse::success(stats))
}
