// PATCH /api/admin/tenants/:id - apply a partial change-set

use axum::{extract::Path, Extension, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{TenantChanges, TenantService};

pub async fn tenant_update(
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(changes): Json<TenantChanges>,
) -> ApiResult<Value> {
    let service = TenantService::new().await?;
    service.update(id, changes).await?;

    tracing::info!(admin = %admin.email, tenant_id = %id, "console: tenant updated");
    Ok(ApiResponse::success(json!({ "updated": true })))
}
