use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    ActivityAction, ActivityLogEntry, Tenant, TenantPlan, TenantStatus, TenantSummary,
};
use crate::services::view_cache::{self, ViewCache};

/// Fixed page size for tenant listings.
pub const PAGE_SIZE: i64 = 10;

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 100;
const SUBDOMAIN_MIN: usize = 3;
const SUBDOMAIN_MAX: usize = 50;
const MAX_STUDENTS_MIN: i32 = 10;
const MAX_STUDENTS_MAX: i32 = 10000;

#[derive(Debug, thiserror::Error)]
pub enum TenantError {
    #[error("Invalid tenant data")]
    Validation { field_errors: HashMap<String, String> },
    #[error("Subdomain already exists: {0}")]
    Conflict(String),
    #[error("Tenant not found: {0}")]
    NotFound(Uuid),
    #[error("Database manager error: {0}")]
    Manager(#[from] DatabaseError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl TenantError {
    fn validation(field_errors: HashMap<String, String>) -> Self {
        TenantError::Validation { field_errors }
    }
}

/// Input for tenant creation. `admin_email` and `max_students` fall back to
/// derived defaults when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub name: String,
    pub subdomain: String,
    pub plan: TenantPlan,
    pub admin_email: Option<String>,
    pub max_students: Option<i32>,
}

/// Explicit change-set for partial updates. An absent field is left
/// untouched; `admin_email` distinguishes "absent" from an explicit null so
/// a clear attempt can be rejected rather than silently ignored. The
/// subdomain is immutable and deliberately not part of the change-set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantChanges {
    pub name: Option<String>,
    pub plan: Option<TenantPlan>,
    pub status: Option<TenantStatus>,
    pub max_students: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub admin_email: Option<Option<String>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl TenantChanges {
    /// Field keys present in this change-set, in a stable order. Used for
    /// the audit description.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.plan.is_some() {
            fields.push("plan");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.max_students.is_some() {
            fields.push("max_students");
        }
        if self.admin_email.is_some() {
            fields.push("admin_email");
        }
        fields
    }
}

/// Listing filters. `search` is a case-sensitive substring match over name
/// and subdomain; `page` is 1-based.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantListQuery {
    pub search: Option<String>,
    pub plan: Option<TenantPlan>,
    pub status: Option<TenantStatus>,
    pub page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TenantPage {
    pub tenants: Vec<TenantSummary>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

/// Tenant plus the derived detail the console shows: live occupancy and the
/// ten most recent audit entries.
#[derive(Debug, Serialize)]
pub struct TenantDetail {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub student_count: i64,
    pub activity: Vec<ActivityLogEntry>,
}

pub struct TenantService {
    pool: PgPool,
}

impl TenantService {
    pub async fn new() -> Result<Self, TenantError> {
        let pool = DatabaseManager::main_pool().await?;
        Ok(Self { pool })
    }

    /// Build against an explicit pool (used by database-coupled tests)
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new tenant. The insert is a single atomic statement; the
    /// store's unique index on subdomain is the sole uniqueness check, and
    /// its rejection surfaces as `Conflict`.
    pub async fn create(&self, input: CreateTenant) -> Result<Tenant, TenantError> {
        validate_create(&input)?;

        let admin_email = input
            .admin_email
            .clone()
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| derived_admin_email(&input.subdomain));
        let max_students = input
            .max_students
            .unwrap_or_else(|| input.plan.default_student_limit());

        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name, subdomain, plan, status, admin_email, max_students)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.subdomain)
        .bind(input.plan)
        .bind(TenantStatus::Active)
        .bind(&admin_email)
        .bind(max_students)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                TenantError::Conflict(input.subdomain.clone())
            } else {
                TenantError::Database(e)
            }
        })?;

        self.log_activity(
            tenant.id,
            ActivityAction::TenantCreated,
            format!(
                "Tenant {} created with {} plan",
                tenant.name,
                tenant.plan.as_str()
            ),
        )
        .await?;

        ViewCache::global().invalidate(view_cache::TENANT_LIST_TAG);
        info!(subdomain = %tenant.subdomain, "tenant created");
        Ok(tenant)
    }

    /// Fetch a live tenant with its student count and recent activity.
    /// Soft-deleted tenants resolve to `NotFound`.
    pub async fn get(&self, id: Uuid) -> Result<TenantDetail, TenantError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            "SELECT * FROM tenants WHERE id = $1 AND is_deleted = false",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TenantError::NotFound(id))?;

        let student_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE tenant_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        let activity = sqlx::query_as::<_, ActivityLogEntry>(
            r#"
            SELECT id, tenant_id, action, description, created_at
            FROM activity_logs
            WHERE tenant_id = $1
            ORDER BY created_at DESC
            LIMIT 10
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(TenantDetail {
            tenant,
            student_count,
            activity,
        })
    }

    /// Paginated listing, newest first. A page past the end yields an empty
    /// page rather than an error.
    pub async fn list(&self, query: TenantListQuery) -> Result<TenantPage, TenantError> {
        let page = query.page.unwrap_or(1).max(1);
        let offset = (page - 1) * PAGE_SIZE;

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM tenants");
        push_filters(&mut count_qb, &query);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::new(
            "SELECT id, name, subdomain, plan, status, admin_email, max_students, \
             (SELECT COUNT(*) FROM students s WHERE s.tenant_id = tenants.id) AS student_count, \
             created_at FROM tenants",
        );
        push_filters(&mut qb, &query);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(PAGE_SIZE)
            .push(" OFFSET ")
            .push_bind(offset);

        let tenants = qb
            .build_query_as::<TenantSummary>()
            .fetch_all(&self.pool)
            .await?;

        Ok(TenantPage {
            tenants,
            total,
            page,
            total_pages: page_count(total),
        })
    }

    /// Apply a change-set to a live tenant. Only present fields are written;
    /// one `TENANT_UPDATED` entry names the changed keys.
    pub async fn update(&self, id: Uuid, changes: TenantChanges) -> Result<(), TenantError> {
        validate_changes(&changes)?;

        let changed = changes.changed_fields();

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE tenants SET updated_at = now()");
        if let Some(name) = changes.name.clone() {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(plan) = changes.plan {
            qb.push(", plan = ").push_bind(plan);
        }
        if let Some(status) = changes.status {
            qb.push(", status = ").push_bind(status);
        }
        if let Some(max_students) = changes.max_students {
            qb.push(", max_students = ").push_bind(max_students);
        }
        if let Some(Some(admin_email)) = changes.admin_email.clone() {
            qb.push(", admin_email = ").push_bind(admin_email);
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND is_deleted = false");

        let result = qb.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(TenantError::NotFound(id));
        }

        self.log_activity(
            id,
            ActivityAction::TenantUpdated,
            format!("Tenant updated: {}", changed.join(", ")),
        )
        .await?;

        let cache = ViewCache::global();
        cache.invalidate(view_cache::TENANT_LIST_TAG);
        cache.invalidate(&view_cache::tenant_detail_tag(id));
        info!(tenant_id = %id, fields = ?changed, "tenant updated");
        Ok(())
    }

    /// Soft-delete: flag the row, stamp `deleted_at`, force status to
    /// inactive. Re-applying on an already-deleted tenant rewrites the same
    /// state but still appends a fresh audit entry.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), TenantError> {
        let result = sqlx::query(
            r#"
            UPDATE tenants
            SET is_deleted = true, deleted_at = now(), status = $1, updated_at = now()
            WHERE id = $2
            "#,
        )
        .bind(TenantStatus::Inactive)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TenantError::NotFound(id));
        }

        self.log_activity(
            id,
            ActivityAction::TenantDeleted,
            "Tenant soft deleted".to_string(),
        )
        .await?;

        ViewCache::global().invalidate(view_cache::TENANT_LIST_TAG);
        info!(tenant_id = %id, "tenant soft deleted");
        Ok(())
    }

    /// Append one audit entry. The trail is append-only; nothing here ever
    /// updates or deletes existing rows.
    async fn log_activity(
        &self,
        tenant_id: Uuid,
        action: ActivityAction,
        description: String,
    ) -> Result<(), TenantError> {
        sqlx::query("INSERT INTO activity_logs (tenant_id, action, description) VALUES ($1, $2, $3)")
            .bind(tenant_id)
            .bind(action.as_str())
            .bind(description)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &TenantListQuery) {
    qb.push(" WHERE is_deleted = false");
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR subdomain LIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(plan) = query.plan {
        qb.push(" AND plan = ").push_bind(plan);
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
}

/// Total page count at the fixed page size.
pub fn page_count(total: i64) -> i64 {
    (total + PAGE_SIZE - 1) / PAGE_SIZE
}

pub fn derived_admin_email(subdomain: &str) -> String {
    format!("{}@epkl.id", subdomain)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_valid_subdomain_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'
}

fn validate_create(input: &CreateTenant) -> Result<(), TenantError> {
    let mut errors = HashMap::new();

    let name_len = input.name.chars().count();
    if !(NAME_MIN..=NAME_MAX).contains(&name_len) {
        errors.insert(
            "name".to_string(),
            format!("must be {} to {} characters", NAME_MIN, NAME_MAX),
        );
    }

    let sub_len = input.subdomain.len();
    if !(SUBDOMAIN_MIN..=SUBDOMAIN_MAX).contains(&sub_len) {
        errors.insert(
            "subdomain".to_string(),
            format!("must be {} to {} characters", SUBDOMAIN_MIN, SUBDOMAIN_MAX),
        );
    } else if !input.subdomain.chars().all(is_valid_subdomain_char) {
        errors.insert(
            "subdomain".to_string(),
            "may only contain lowercase letters, digits, and hyphens".to_string(),
        );
    }

    if let Some(max_students) = input.max_students {
        if !(MAX_STUDENTS_MIN..=MAX_STUDENTS_MAX).contains(&max_students) {
            errors.insert(
                "max_students".to_string(),
                format!("must be between {} and {}", MAX_STUDENTS_MIN, MAX_STUDENTS_MAX),
            );
        }
    }

    if let Some(email) = input.admin_email.as_deref() {
        if !email.is_empty() && !is_plausible_email(email) {
            errors.insert("admin_email".to_string(), "must be an email address".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TenantError::validation(errors))
    }
}

fn validate_changes(changes: &TenantChanges) -> Result<(), TenantError> {
    let mut errors = HashMap::new();

    if changes.changed_fields().is_empty() {
        errors.insert("fields".to_string(), "no fields to update".to_string());
        return Err(TenantError::validation(errors));
    }

    if let Some(name) = changes.name.as_deref() {
        let name_len = name.chars().count();
        if !(NAME_MIN..=NAME_MAX).contains(&name_len) {
            errors.insert(
                "name".to_string(),
                format!("must be {} to {} characters", NAME_MIN, NAME_MAX),
            );
        }
    }

    if let Some(max_students) = changes.max_students {
        if !(MAX_STUDENTS_MIN..=MAX_STUDENTS_MAX).contains(&max_students) {
            errors.insert(
                "max_students".to_string(),
                format!("must be between {} and {}", MAX_STUDENTS_MIN, MAX_STUDENTS_MAX),
            );
        }
    }

    match changes.admin_email.as_ref() {
        Some(None) => {
            errors.insert("admin_email".to_string(), "cannot be cleared".to_string());
        }
        Some(Some(email)) => {
            if !is_plausible_email(email) {
                errors.insert("admin_email".to_string(), "must be an email address".to_string());
            }
        }
        None => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TenantError::validation(errors))
    }
}

// Shape check only; delivery is out of scope so no full RFC validation
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}
