use sqlx::PgPool;
use time::OffsetDateTime;

use crate::db::models::Tenant;

pub struct TenantRepository;

impl TenantRepository {
    /// Status is left to the column default (`pending`); only the billing
    /// collaborator moves a tenant into `trial` or `active`.
    pub async fn insert(
        pool: &PgPool,
        name: &str,
        slug: &str,
        trial_ends_at: OffsetDateTime,
    ) -> Result<Tenant, sqlx::Error> {
        sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name, slug, plan, trial_ends_at)
            VALUES ($1, $2, 'trial', $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(slug)
        .bind(trial_ends_at)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Tenant>, sqlx::Error> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Tenant>, sqlx::Error> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    pub async fn update_logo_url(
        pool: &PgPool,
        id: i64,
        logo_url: &str,
    ) -> Result<Tenant, sqlx::Error> {
        sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants
            SET logo_url = $1, updated_at = now()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(logo_url)
        .bind(id)
        .fetch_one(pool)
        .await
    }
}
