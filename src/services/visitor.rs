use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sqlx::PgPool;
use time::{Date, Duration, OffsetDateTime};

use crate::collaborators::mail::{dispatch, FailurePolicy, MailMessage, Mailer};
use crate::collaborators::storage::BlobStorage;
use crate::db::models::{NewVisitor, Visitor, VisitorPass, VisitorStatus};
use crate::db::repositories::VisitorRepository;
use crate::error::{AppError, AppResult};
use crate::services::subscription::{self, QuotaKind};

/// `CMP<tenantId>-<YYYYMMDD>-<NNNNN>`; the suffix is the 1-based ordinal of
/// the visitor among the tenant's check-ins that calendar day. External
/// passes and QR artifacts embed this string verbatim.
pub fn visitor_code(tenant_id: i64, date: Date, ordinal: i64) -> String {
    format!(
        "CMP{}-{:04}{:02}{:02}-{:05}",
        tenant_id,
        date.year(),
        date.month() as u8,
        date.day(),
        ordinal
    )
}

pub fn photo_key(tenant_id: i64, code: &str) -> String {
    format!("companies/{}/visitors/{}.jpg", tenant_id, code)
}

/// `[midnight, midnight+1d)` bounds of a calendar day.
pub fn day_bounds(date: Date) -> (OffsetDateTime, OffsetDateTime) {
    let start = date.midnight().assume_utc();
    (start, start + Duration::days(1))
}

/// Check a visitor in: quota-gated insert, daily-ordinal code assignment,
/// photo upload, best-effort pass mail.
///
/// The ordinal comes from a count query over the rows committed so far, so
/// two check-ins racing on the same tenant and day can mint the same suffix.
/// Accepted as-is; a per-(tenant, day) counter row would close it at the cost
/// of changing observable behavior under load.
pub async fn check_in(
    pool: &PgPool,
    mailer: &dyn Mailer,
    storage: &dyn BlobStorage,
    tenant_id: i64,
    payload: NewVisitor,
) -> AppResult<VisitorPass> {
    let resolved = subscription::resolve(pool, tenant_id).await?;
    subscription::ensure_capacity(pool, &resolved, QuotaKind::Visitors).await?;

    let photo_bytes = payload
        .photo_base64
        .as_deref()
        .map(|b64| {
            BASE64
                .decode(b64)
                .map_err(|_| AppError::Validation("Photo must be valid base64".into()))
        })
        .transpose()?;

    let now = OffsetDateTime::now_utc();
    let visitor = VisitorRepository::insert(
        pool,
        tenant_id,
        &payload.full_name,
        &payload.phone,
        payload.email.as_deref(),
        now,
    )
    .await?;

    // Count includes the row just inserted, so it is the 1-based ordinal.
    let (from, to) = day_bounds(now.date());
    let ordinal = VisitorRepository::count_checked_in_between(pool, tenant_id, from, to).await?;
    let code = visitor_code(tenant_id, now.date(), ordinal);

    // Photo upload failure is a hard failure of check-in.
    let photo_url = match photo_bytes {
        Some(bytes) => Some(
            storage
                .upload(bytes, "image/jpeg", &photo_key(tenant_id, &code))
                .await
                .map_err(|e| AppError::Internal(format!("photo upload failed: {}", e)))?,
        ),
        None => None,
    };

    let visitor =
        VisitorRepository::assign_code_and_photo(pool, visitor.id, &code, photo_url.as_deref())
            .await?;

    send_pass_mail(pool, mailer, &visitor).await?;

    Ok(VisitorPass {
        id: visitor.id,
        visitor_code: code,
        full_name: visitor.full_name,
        phone: visitor.phone,
        email: visitor.email,
        photo_url: visitor.photo_url,
        status: VisitorStatus::In,
    })
}

/// At most one pass mail per visitor; dispatch failure is logged and the
/// check-in still succeeds.
async fn send_pass_mail(pool: &PgPool, mailer: &dyn Mailer, visitor: &Visitor) -> AppResult<()> {
    let Some(email) = visitor.email.clone() else {
        return Ok(());
    };
    if visitor.pass_mail_sent {
        return Ok(());
    }

    let code = visitor.visitor_code.as_deref().unwrap_or_default();
    let message = MailMessage {
        to: email,
        subject: "Your visitor pass".to_string(),
        html_body: format!(
            "<p>Welcome {}. Your visitor code is <strong>{}</strong>. \
             Present it at the desk when leaving.</p>",
            visitor.full_name, code
        ),
    };

    let sent = dispatch(mailer, FailurePolicy::LogAndContinue, message).await?;
    if sent {
        VisitorRepository::mark_pass_mail_sent(pool, visitor.id).await?;
    }
    Ok(())
}

/// `IN -> OUT`, exactly once. Zero affected rows means unknown code or a
/// visitor that already left; both surface as `NotFound`.
pub async fn check_out(pool: &PgPool, tenant_id: i64, visitor_code: &str) -> AppResult<()> {
    let affected =
        VisitorRepository::checkout(pool, tenant_id, visitor_code, OffsetDateTime::now_utc())
            .await?;
    if affected == 0 {
        return Err(AppError::NotFound(format!(
            "checked-in visitor {}",
            visitor_code
        )));
    }
    Ok(())
}

/// Pass lookup, e.g. for validating a scanned QR code at the desk.
pub async fn get_by_code(pool: &PgPool, tenant_id: i64, visitor_code: &str) -> AppResult<Visitor> {
    VisitorRepository::find_by_code(pool, tenant_id, visitor_code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("visitor {}", visitor_code)))
}

pub async fn list_today(pool: &PgPool, tenant_id: i64) -> AppResult<Vec<Visitor>> {
    let (from, to) = day_bounds(OffsetDateTime::now_utc().date());
    Ok(VisitorRepository::list_between(pool, tenant_id, from, to).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn code_embeds_tenant_date_and_padded_ordinal() {
        assert_eq!(visitor_code(7, date!(2024 - 01 - 10), 1), "CMP7-20240110-00001");
        assert_eq!(visitor_code(7, date!(2024 - 01 - 10), 2), "CMP7-20240110-00002");
        assert_eq!(
            visitor_code(123, date!(2025 - 12 - 31), 99999),
            "CMP123-20251231-99999"
        );
    }

    #[test]
    fn ordinal_wider_than_five_digits_is_not_truncated() {
        assert_eq!(
            visitor_code(1, date!(2024 - 06 - 05), 123456),
            "CMP1-20240605-123456"
        );
    }

    #[test]
    fn photo_key_is_deterministic() {
        assert_eq!(
            photo_key(7, "CMP7-20240110-00001"),
            "companies/7/visitors/CMP7-20240110-00001.jpg"
        );
    }

    #[test]
    fn day_bounds_cover_exactly_one_day() {
        let (from, to) = day_bounds(date!(2024 - 01 - 10));
        assert_eq!(from.date(), date!(2024 - 01 - 10));
        assert_eq!(to - from, Duration::days(1));
        assert_eq!(from.time(), time::Time::MIDNIGHT);
    }
}
