use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};

use crate::collaborators::mail::{dispatch, FailurePolicy, MailMessage, Mailer};
use crate::collaborators::storage::BlobStorage;
use crate::config;
use crate::db::models::{RegisterVisitorPayload, Tenant, VisitorPass};
use crate::db::repositories::OtpRepository;
use crate::error::{AppError, AppResult};
use crate::services::visitor;

/// 6-digit numeric one-time code.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    format!("{:06}", rand::Rng::random_range(&mut rng, 0..1_000_000))
}

/// SHA-256 hash of a code, hex-encoded. Only the hash is stored.
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

/// Cryptographically random opaque session token
/// (32 bytes, base64url-encoded, no padding).
pub fn generate_session_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Seconds left before a resend is allowed, `None` once the cooldown has
/// elapsed.
pub fn remaining_cooldown(
    last_sent: OffsetDateTime,
    now: OffsetDateTime,
    cooldown_secs: i64,
) -> Option<i64> {
    let elapsed = (now - last_sent).whole_seconds();
    if elapsed < cooldown_secs {
        Some(cooldown_secs - elapsed)
    } else {
        None
    }
}

/// A verified session token is usable only within the fixed window after
/// verification.
pub fn within_session_window(
    verified_at: OffsetDateTime,
    now: OffsetDateTime,
    window_minutes: i64,
) -> bool {
    now - verified_at <= Duration::minutes(window_minutes)
}

/// Issue a fresh code for (tenant, email). OTP mail is blocking: without the
/// code the user has no path forward, so dispatch failure fails the send.
pub async fn send_otp(
    pool: &PgPool,
    mailer: &dyn Mailer,
    tenant: &Tenant,
    email: &str,
) -> AppResult<()> {
    let settings = &config::get().app;
    let now = OffsetDateTime::now_utc();

    if let Some(previous) = OtpRepository::latest_for_email(pool, tenant.id, email).await? {
        if let Some(wait_secs) =
            remaining_cooldown(previous.created_at, now, settings.otp_cooldown_secs)
        {
            return Err(AppError::TooManyRequests { wait_secs });
        }
    }

    // A new send invalidates any prior unverified code for this pair.
    OtpRepository::delete_unverified(pool, tenant.id, email).await?;

    let code = generate_code();
    let expires_at = now + Duration::minutes(settings.otp_ttl_minutes);
    OtpRepository::insert(pool, tenant.id, email, &hash_code(&code), expires_at).await?;

    dispatch(
        mailer,
        FailurePolicy::Propagate,
        MailMessage {
            to: email.to_string(),
            subject: format!("Your verification code for {}", tenant.name),
            html_body: format!(
                "<p>Your verification code is <strong>{}</strong>. \
                 It expires in {} minutes.</p>",
                code, settings.otp_ttl_minutes
            ),
        },
    )
    .await?;

    Ok(())
}

/// Verify a submitted code and mint the single-use session token.
pub async fn verify_otp(
    pool: &PgPool,
    tenant_id: i64,
    email: &str,
    code: &str,
) -> AppResult<String> {
    let session = OtpRepository::latest_unverified(pool, tenant_id, email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("pending verification for {}", email)))?;

    let now = OffsetDateTime::now_utc();
    if now >= session.expires_at {
        return Err(AppError::OtpExpired);
    }
    if hash_code(code) != session.code_hash {
        return Err(AppError::OtpMismatch);
    }

    let token = generate_session_token();
    OtpRepository::mark_verified(pool, session.id, &token, now).await?;

    Ok(token)
}

/// Consume a session token and register the visitor. The token row is locked
/// for the duration and nulled only once check-in succeeds, so a token is
/// spent exactly once and a failed registration leaves it usable.
pub async fn register_visitor(
    pool: &PgPool,
    mailer: &dyn Mailer,
    storage: &dyn BlobStorage,
    tenant: &Tenant,
    payload: RegisterVisitorPayload,
) -> AppResult<VisitorPass> {
    let settings = &config::get().app;
    let now = OffsetDateTime::now_utc();

    let mut tx = pool.begin().await?;

    let session = OtpRepository::find_by_token_for_update(&mut tx, &payload.session_token)
        .await?
        .filter(|s| s.tenant_id == tenant.id)
        .ok_or(AppError::SessionExpired)?;

    let verified_at = session.verified_at.ok_or(AppError::SessionExpired)?;
    if !within_session_window(verified_at, now, settings.otp_session_window_minutes) {
        return Err(AppError::SessionExpired);
    }

    // The visitor record carries the address that was actually verified.
    let mut visitor = payload.visitor;
    visitor.email = Some(session.email.clone());

    let pass = visitor::check_in(pool, mailer, storage, tenant.id, visitor).await?;

    OtpRepository::clear_token(&mut tx, session.id).await?;
    tx.commit().await?;

    Ok(pass)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn code_hash_is_deterministic_and_distinct() {
        assert_eq!(hash_code("123456"), hash_code("123456"));
        assert_ne!(hash_code("123456"), hash_code("654321"));
    }

    #[test]
    fn session_token_is_url_safe() {
        let token = generate_session_token();
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        // 32 bytes -> 43 base64url chars.
        assert_eq!(token.len(), 43);
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_session_token(), generate_session_token());
    }

    #[test]
    fn cooldown_reports_remaining_seconds() {
        let now = OffsetDateTime::now_utc();
        let sent = now - Duration::seconds(20);
        assert_eq!(remaining_cooldown(sent, now, 60), Some(40));
        assert_eq!(remaining_cooldown(now - Duration::seconds(60), now, 60), None);
        assert_eq!(remaining_cooldown(now - Duration::seconds(90), now, 60), None);
    }

    #[test]
    fn session_window_is_inclusive_until_the_limit() {
        let now = OffsetDateTime::now_utc();
        assert!(within_session_window(now - Duration::minutes(29), now, 30));
        assert!(within_session_window(now - Duration::minutes(30), now, 30));
        assert!(!within_session_window(now - Duration::minutes(31), now, 30));
    }
}
