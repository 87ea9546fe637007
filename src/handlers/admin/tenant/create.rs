// POST /api/admin/tenants - provision a new school tenant

use axum::{Extension, Json};

use crate::database::models::Tenant;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{CreateTenant, TenantService};

pub async fn tenant_create(
    Extension(admin): Extension<AuthUser>,
    Json(input): Json<CreateTenant>,
) -> ApiResult<Tenant> {
    let service = TenantService::new().await?;
    let tenant = service.create(input).await?;

    tracing::info!(admin = %admin.email, subdomain = %tenant.subdomain, "console: tenant created");
    Ok(ApiResponse::created(tenant))
}
