use sqlx::PgPool;
use time::OffsetDateTime;

use crate::db::models::Visitor;

pub struct VisitorRepository;

impl VisitorRepository {
    pub async fn insert(
        pool: &PgPool,
        tenant_id: i64,
        full_name: &str,
        phone: &str,
        email: Option<&str>,
        check_in_at: OffsetDateTime,
    ) -> Result<Visitor, sqlx::Error> {
        sqlx::query_as::<_, Visitor>(
            r#"
            INSERT INTO visitors (tenant_id, full_name, phone, email, status, check_in_at)
            VALUES ($1, $2, $3, $4, 'IN', $5)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(full_name)
        .bind(phone)
        .bind(email)
        .bind(check_in_at)
        .fetch_one(pool)
        .await
    }

    /// Visitors checked in within `[from, to)` for a tenant. The caller passes
    /// calendar-day bounds to get the daily ordinal.
    pub async fn count_checked_in_between(
        pool: &PgPool,
        tenant_id: i64,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM visitors
            WHERE tenant_id = $1 AND check_in_at >= $2 AND check_in_at < $3
            "#,
        )
        .bind(tenant_id)
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await
    }

    pub async fn assign_code_and_photo(
        pool: &PgPool,
        id: i64,
        visitor_code: &str,
        photo_url: Option<&str>,
    ) -> Result<Visitor, sqlx::Error> {
        sqlx::query_as::<_, Visitor>(
            r#"
            UPDATE visitors
            SET visitor_code = $1, photo_url = $2
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(visitor_code)
        .bind(photo_url)
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// `false -> true` at most once; rows already flagged are left untouched.
    pub async fn mark_pass_mail_sent(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE visitors SET pass_mail_sent = TRUE WHERE id = $1 AND pass_mail_sent = FALSE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_code(
        pool: &PgPool,
        tenant_id: i64,
        visitor_code: &str,
    ) -> Result<Option<Visitor>, sqlx::Error> {
        sqlx::query_as::<_, Visitor>(
            "SELECT * FROM visitors WHERE visitor_code = $1 AND tenant_id = $2",
        )
        .bind(visitor_code)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await
    }

    /// The conditional update is the concurrency guard: of two simultaneous
    /// checkouts only one matches `status = 'IN'` and affects a row.
    pub async fn checkout(
        pool: &PgPool,
        tenant_id: i64,
        visitor_code: &str,
        check_out_at: OffsetDateTime,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE visitors
            SET status = 'OUT', check_out_at = $1
            WHERE visitor_code = $2 AND tenant_id = $3 AND status = 'IN'
            "#,
        )
        .bind(check_out_at)
        .bind(visitor_code)
        .bind(tenant_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_by_tenant(pool: &PgPool, tenant_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM visitors WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(pool)
            .await
    }

    pub async fn list_between(
        pool: &PgPool,
        tenant_id: i64,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<Visitor>, sqlx::Error> {
        sqlx::query_as::<_, Visitor>(
            r#"
            SELECT * FROM visitors
            WHERE tenant_id = $1 AND check_in_at >= $2 AND check_in_at < $3
            ORDER BY check_in_at ASC
            "#,
        )
        .bind(tenant_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }
}
