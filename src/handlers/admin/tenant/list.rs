// GET /api/admin/tenants - paginated tenant listing with filters

use axum::extract::Query;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{TenantListQuery, TenantPage, TenantService};

pub async fn tenant_list(Query(query): Query<TenantListQuery>) -> ApiResult<TenantPage> {
    let service = TenantService::new().await?;
    let page = service.list(query).await?;
    Ok(ApiResponse::success(page))
}
