// DELETE /api/admin/tenants/:id - soft delete (preserves data)

use axum::{extract::Path, Extension};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::TenantService;

pub async fn tenant_delete(
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let service = TenantService::new().await?;
    service.soft_delete(id).await?;

    tracing::info!(admin = %admin.email, tenant_id = %id, "console: tenant soft deleted");
    Ok(ApiResponse::success(json!({ "deleted": true })))
}
