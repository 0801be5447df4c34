use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};

use crate::collaborators::storage::BlobStorage;
use crate::config;
use crate::db::models::{NewTenant, Tenant, UpdateTenantLogo};
use crate::db::repositories::TenantRepository;
use crate::db::DatabaseError;
use crate::error::{AppError, AppResult};

/// URL-safe slug: lowercase alphanumerics with single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "company".to_string()
    } else {
        slug
    }
}

/// Candidate slug for the nth attempt: the base name first, then numeric
/// suffixes.
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt + 1)
    }
}

const SLUG_ATTEMPTS: u32 = 20;

/// Register a tenant on the trial plan, status `pending` until the billing
/// collaborator activates it. Slug uniqueness rides on the unique constraint:
/// on collision the insert retries with the next suffix.
pub async fn register_tenant(pool: &PgPool, payload: NewTenant) -> AppResult<Tenant> {
    let base = slugify(&payload.name);
    let trial_ends_at = OffsetDateTime::now_utc() + Duration::days(config::get().app.trial_days);

    for attempt in 0..SLUG_ATTEMPTS {
        let slug = slug_candidate(&base, attempt);
        match TenantRepository::insert(pool, &payload.name, &slug, trial_ends_at).await {
            Ok(tenant) => return Ok(tenant),
            Err(err) => match DatabaseError::from(err) {
                DatabaseError::Duplicate => continue,
                other => return Err(other.into()),
            },
        }
    }

    Err(AppError::Internal(format!(
        "could not allocate a unique slug for '{}'",
        base
    )))
}

pub async fn get_tenant(pool: &PgPool, tenant_id: i64) -> AppResult<Tenant> {
    TenantRepository::find_by_id(pool, tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("tenant {}", tenant_id)))
}

pub async fn get_tenant_by_slug(pool: &PgPool, slug: &str) -> AppResult<Tenant> {
    TenantRepository::find_by_slug(pool, slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("tenant '{}'", slug)))
}

/// Upload a new logo and point the tenant at it. Upload failure is a hard
/// failure of the operation.
pub async fn update_logo(
    pool: &PgPool,
    storage: &dyn BlobStorage,
    tenant_id: i64,
    payload: UpdateTenantLogo,
) -> AppResult<Tenant> {
    let tenant = get_tenant(pool, tenant_id).await?;

    let bytes = BASE64
        .decode(&payload.image_base64)
        .map_err(|_| AppError::Validation("Logo must be valid base64".into()))?;

    let extension = payload.extension.trim_start_matches('.');
    let key = format!("companies/{}/logo.{}", tenant.slug, extension);
    let content_type = match extension {
        "png" => "image/png",
        "svg" => "image/svg+xml",
        _ => "image/jpeg",
    };

    let url = storage
        .upload(bytes, content_type, &key)
        .await
        .map_err(|e| AppError::Internal(format!("logo upload failed: {}", e)))?;

    Ok(TenantRepository::update_logo_url(pool, tenant.id, &url).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_lowercase_dashed_alphanumerics() {
        assert_eq!(slugify("Acme Corp"), "acme-corp");
        assert_eq!(slugify("  Acme   Corp  "), "acme-corp");
        assert_eq!(slugify("Müller & Söhne GmbH"), "m-ller-s-hne-gmbh");
        assert_eq!(slugify("ACME"), "acme");
    }

    #[test]
    fn empty_or_symbol_only_names_fall_back() {
        assert_eq!(slugify(""), "company");
        assert_eq!(slugify("!!!"), "company");
    }

    #[test]
    fn candidates_disambiguate_with_numeric_suffixes() {
        assert_eq!(slug_candidate("acme", 0), "acme");
        assert_eq!(slug_candidate("acme", 1), "acme-2");
        assert_eq!(slug_candidate("acme", 2), "acme-3");
    }
}
