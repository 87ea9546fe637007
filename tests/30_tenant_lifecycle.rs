// Database-coupled lifecycle properties. These run only when
// EPKL_TEST_DATABASE_URL points at a Postgres database with the migrations
// applied; otherwise each test skips.

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use epkl_admin_api::database::models::{TenantPlan, TenantStatus};
use epkl_admin_api::services::{
    CreateTenant, TenantChanges, TenantError, TenantListQuery, TenantService,
};

async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("EPKL_TEST_DATABASE_URL").ok()?;
    PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .ok()
}

fn unique_subdomain(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

fn create_input(subdomain: &str) -> CreateTenant {
    CreateTenant {
        name: "SMKN 9 Jakarta".to_string(),
        subdomain: subdomain.to_string(),
        plan: TenantPlan::Free,
        admin_email: None,
        max_students: Some(100),
    }
}

#[tokio::test]
async fn duplicate_subdomain_yields_conflict() -> Result<()> {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: EPKL_TEST_DATABASE_URL not set");
        return Ok(());
    };
    let service = TenantService::with_pool(pool);
    let subdomain = unique_subdomain("dup");

    service.create(create_input(&subdomain)).await?;
    let second = service.create(create_input(&subdomain)).await;

    assert!(matches!(second, Err(TenantError::Conflict(s)) if s == subdomain));
    Ok(())
}

#[tokio::test]
async fn soft_delete_excludes_from_get_and_list() -> Result<()> {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: EPKL_TEST_DATABASE_URL not set");
        return Ok(());
    };
    let service = TenantService::with_pool(pool);
    let subdomain = unique_subdomain("del");

    let tenant = service.create(create_input(&subdomain)).await?;
    service.soft_delete(tenant.id).await?;

    assert!(matches!(
        service.get(tenant.id).await,
        Err(TenantError::NotFound(_))
    ));

    let page = service
        .list(TenantListQuery {
            search: Some(subdomain.clone()),
            ..Default::default()
        })
        .await?;
    assert_eq!(page.total, 0);
    assert!(page.tenants.is_empty());
    Ok(())
}

#[tokio::test]
async fn every_mutation_appends_exactly_one_audit_entry() -> Result<()> {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: EPKL_TEST_DATABASE_URL not set");
        return Ok(());
    };
    let service = TenantService::with_pool(pool.clone());
    let subdomain = unique_subdomain("audit");

    let tenant = service.create(create_input(&subdomain)).await?;

    let actions = |tenant_id: Uuid| {
        let pool = pool.clone();
        async move {
            sqlx::query_scalar::<_, String>(
                "SELECT action FROM activity_logs WHERE tenant_id = $1 ORDER BY id",
            )
            .bind(tenant_id)
            .fetch_all(&pool)
            .await
        }
    };

    assert_eq!(actions(tenant.id).await?, vec!["TENANT_CREATED"]);

    // A rejected mutation must not touch the trail
    let rejected = service
        .update(tenant.id, TenantChanges::default())
        .await;
    assert!(matches!(rejected, Err(TenantError::Validation { .. })));
    assert_eq!(actions(tenant.id).await?.len(), 1);

    service
        .update(
            tenant.id,
            TenantChanges {
                plan: Some(TenantPlan::Pro),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(
        actions(tenant.id).await?,
        vec!["TENANT_CREATED", "TENANT_UPDATED"]
    );

    service.soft_delete(tenant.id).await?;
    assert_eq!(
        actions(tenant.id).await?,
        vec!["TENANT_CREATED", "TENANT_UPDATED", "TENANT_DELETED"]
    );
    Ok(())
}

#[tokio::test]
async fn partial_update_changes_only_named_fields() -> Result<()> {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: EPKL_TEST_DATABASE_URL not set");
        return Ok(());
    };
    let service = TenantService::with_pool(pool);
    let subdomain = unique_subdomain("patch");

    let tenant = service.create(create_input(&subdomain)).await?;
    service
        .update(
            tenant.id,
            TenantChanges {
                plan: Some(TenantPlan::Pro),
                ..Default::default()
            },
        )
        .await?;

    let detail = service.get(tenant.id).await?;
    assert_eq!(detail.tenant.plan, TenantPlan::Pro);
    assert_eq!(detail.tenant.name, tenant.name);
    assert_eq!(detail.tenant.status, TenantStatus::Active);
    assert_eq!(detail.tenant.max_students, tenant.max_students);

    let latest = detail.activity.first().expect("audit entry");
    assert_eq!(latest.action, "TENANT_UPDATED");
    assert_eq!(latest.description.as_deref(), Some("Tenant updated: plan"));
    Ok(())
}

#[tokio::test]
async fn listing_paginates_at_fixed_page_size() -> Result<()> {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: EPKL_TEST_DATABASE_URL not set");
        return Ok(());
    };
    let service = TenantService::with_pool(pool);

    // Unique prefix keeps this run isolated from other rows in the table
    let prefix = format!("page-{}", Uuid::new_v4().simple());
    for i in 0..12 {
        service
            .create(create_input(&format!("{}-{}", prefix, i)))
            .await?;
    }

    let query = |page: i64| TenantListQuery {
        search: Some(prefix.clone()),
        page: Some(page),
        ..Default::default()
    };

    let first = service.list(query(1)).await?;
    assert_eq!(first.tenants.len(), 10);
    assert_eq!(first.total, 12);
    assert_eq!(first.total_pages, 2);

    let second = service.list(query(2)).await?;
    assert_eq!(second.tenants.len(), 2);

    // Past the end is an empty page, not an error
    let third = service.list(query(3)).await?;
    assert!(third.tenants.is_empty());
    assert_eq!(third.total, 12);
    Ok(())
}
