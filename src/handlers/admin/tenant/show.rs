// GET /api/admin/tenants/:id - tenant detail with occupancy and audit trail

use axum::extract::Path;
use uuid::Uuid;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{TenantDetail, TenantService};

pub async fn tenant_show(Path(id): Path<Uuid>) -> ApiResult<TenantDetail> {
    let service = TenantService::new().await?;
    let detail = service.get(id).await?;
    Ok(ApiResponse::success(detail))
}
