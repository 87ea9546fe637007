use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::AdminPolicy;
use crate::config;
use crate::middleware::auth::{extract_jwt_from_headers, validate_jwt, AuthUser};

/// Super-admin gate. Runs in front of every console operation: the verified
/// email claim must match the configured allow-list. Failures are redirects,
/// not errors — unauthenticated callers go to sign-in, authenticated but
/// unauthorized callers back to the regular dashboard.
pub async fn admin_gate_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let security = &config::config().security;

    let claims = match extract_jwt_from_headers(&headers).and_then(|token| validate_jwt(&token)) {
        Ok(claims) => claims,
        Err(reason) => {
            tracing::debug!(reason = %reason, "admin gate: unauthenticated request");
            return Redirect::to(&security.sign_in_url).into_response();
        }
    };

    let policy = AdminPolicy::from_config();
    if !policy.allows(&claims.email) {
        tracing::info!(email = %claims.email, "admin gate: email not on allow-list");
        return Redirect::to(&security.dashboard_url).into_response();
    }

    request.extensions_mut().insert(AuthUser::from(claims));
    next.run(request).await
}
