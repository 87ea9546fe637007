mod common;

use anyhow::Result;
use reqwest::{redirect::Policy, Client, StatusCode};
use uuid::Uuid;

use epkl_admin_api::auth::{generate_jwt, Claims};

fn no_redirect_client() -> Client {
    Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("client")
}

fn token_for(email: &str) -> String {
    // Match the secret the spawned server runs with before the config
    // singleton first initializes in this process
    std::env::set_var("JWT_SECRET", common::TEST_JWT_SECRET);
    let claims = Claims::new(Uuid::new_v4(), email.to_string());
    generate_jwt(claims).expect("token")
}

#[tokio::test]
async fn unauthenticated_request_redirects_to_sign_in() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = no_redirect_client();

    let res = client
        .get(format!("{}/api/admin/tenants", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        res.headers().get("location").and_then(|v| v.to_str().ok()),
        Some("/sign-in")
    );
    Ok(())
}

#[tokio::test]
async fn non_admin_email_redirects_to_dashboard() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = no_redirect_client();
    let token = token_for("teacher@smkn9.epkl.id");

    let res = client
        .get(format!("{}/api/admin/stats", server.base_url))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        res.headers().get("location").and_then(|v| v.to_str().ok()),
        Some("/dashboard")
    );
    Ok(())
}

#[tokio::test]
async fn allow_listed_email_passes_the_gate() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = no_redirect_client();
    let token = token_for("admin@epkl.id");

    let res = client
        .get(format!("{}/api/admin/tenants", server.base_url))
        .bearer_auth(token)
        .send()
        .await?;

    // Past the gate the handler needs the store; without DATABASE_URL the
    // request fails downstream, but it must not be a gate redirect
    assert_ne!(res.status(), StatusCode::SEE_OTHER);
    assert_ne!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn malformed_bearer_token_redirects_to_sign_in() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = no_redirect_client();

    let res = client
        .get(format!("{}/api/admin/tenants", server.base_url))
        .bearer_auth("not-a-jwt")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        res.headers().get("location").and_then(|v| v.to_str().ok()),
        Some("/sign-in")
    );
    Ok(())
}
