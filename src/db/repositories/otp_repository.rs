use sqlx::{PgPool, Postgres, Transaction};
use time::OffsetDateTime;

use crate::db::models::OtpSession;

pub struct OtpRepository;

impl OtpRepository {
    /// Most recent row for the pair regardless of state, used for the resend
    /// cooldown check.
    pub async fn latest_for_email(
        pool: &PgPool,
        tenant_id: i64,
        email: &str,
    ) -> Result<Option<OtpSession>, sqlx::Error> {
        sqlx::query_as::<_, OtpSession>(
            r#"
            SELECT * FROM otp_sessions
            WHERE tenant_id = $1 AND email = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(tenant_id)
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// A new send invalidates every prior unverified code for the pair.
    pub async fn delete_unverified(
        pool: &PgPool,
        tenant_id: i64,
        email: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "DELETE FROM otp_sessions WHERE tenant_id = $1 AND email = $2 AND verified = FALSE",
        )
        .bind(tenant_id)
        .bind(email)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn insert(
        pool: &PgPool,
        tenant_id: i64,
        email: &str,
        code_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<OtpSession, sqlx::Error> {
        sqlx::query_as::<_, OtpSession>(
            r#"
            INSERT INTO otp_sessions (tenant_id, email, code_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(email)
        .bind(code_hash)
        .bind(expires_at)
        .fetch_one(pool)
        .await
    }

    pub async fn latest_unverified(
        pool: &PgPool,
        tenant_id: i64,
        email: &str,
    ) -> Result<Option<OtpSession>, sqlx::Error> {
        sqlx::query_as::<_, OtpSession>(
            r#"
            SELECT * FROM otp_sessions
            WHERE tenant_id = $1 AND email = $2 AND verified = FALSE
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(tenant_id)
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    pub async fn mark_verified(
        pool: &PgPool,
        id: i64,
        session_token: &str,
        verified_at: OffsetDateTime,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE otp_sessions
            SET verified = TRUE, session_token = $1, verified_at = $2
            WHERE id = $3
            "#,
        )
        .bind(session_token)
        .bind(verified_at)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Row-locked token lookup so that two registrations racing on the same
    /// token serialize, and the loser observes the nulled token.
    pub async fn find_by_token_for_update(
        tx: &mut Transaction<'_, Postgres>,
        session_token: &str,
    ) -> Result<Option<OtpSession>, sqlx::Error> {
        sqlx::query_as::<_, OtpSession>(
            r#"
            SELECT * FROM otp_sessions
            WHERE session_token = $1 AND verified = TRUE
            FOR UPDATE
            "#,
        )
        .bind(session_token)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Single-use consumption: the token is nulled inside the registration
    /// transaction.
    pub async fn clear_token(
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE otp_sessions SET session_token = NULL WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
