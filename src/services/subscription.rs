use sqlx::PgPool;
use time::OffsetDateTime;

use crate::db::models::{Plan, SubscriptionStatus, Tenant};
use crate::db::repositories::{
    BookingRepository, RoomRepository, TenantRepository, VisitorRepository,
};
use crate::error::{AppError, AppResult};

/// Per-plan resource ceilings. `None` means unlimited.
#[derive(Debug, Clone, Copy)]
pub struct PlanQuotas {
    pub rooms: Option<i64>,
    pub bookings: Option<i64>,
    pub visitors: Option<i64>,
}

/// Fixed quota policy, adjusted only via deployment, never at runtime.
pub const fn quotas_for(plan: Plan) -> PlanQuotas {
    match plan {
        Plan::Trial => PlanQuotas {
            rooms: Some(2),
            bookings: Some(100),
            visitors: Some(100),
        },
        Plan::Business => PlanQuotas {
            rooms: Some(6),
            bookings: Some(1000),
            visitors: None,
        },
        Plan::Enterprise => PlanQuotas {
            rooms: None,
            bookings: None,
            visitors: None,
        },
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedPlan {
    pub tenant: Tenant,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub quotas: PlanQuotas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaKind {
    Rooms,
    Bookings,
    Visitors,
}

impl QuotaKind {
    pub fn noun(&self) -> &'static str {
        match self {
            QuotaKind::Rooms => "rooms",
            QuotaKind::Bookings => "bookings",
            QuotaKind::Visitors => "visitors",
        }
    }
}

/// Gate decision on a tenant snapshot. Expiry observed here is reported to
/// the caller; persisting the `expired` transition is the reconciliation
/// sweep's job, never this read path's.
pub fn check_gate(tenant: &Tenant, now: OffsetDateTime) -> AppResult<()> {
    match tenant.status() {
        SubscriptionStatus::Trial => match tenant.trial_ends_at {
            Some(ends_at) if ends_at > now => Ok(()),
            _ => Err(AppError::TrialExpired),
        },
        SubscriptionStatus::Active => match tenant.subscription_ends_at {
            Some(ends_at) if ends_at > now => Ok(()),
            _ => Err(AppError::SubscriptionExpired),
        },
        _ => Err(AppError::SubscriptionInactive),
    }
}

/// Resolve a tenant snapshot into its effective plan and quotas.
pub fn resolve_tenant(tenant: Tenant) -> AppResult<ResolvedPlan> {
    check_gate(&tenant, OffsetDateTime::now_utc())?;
    let plan = tenant.plan();
    Ok(ResolvedPlan {
        plan,
        status: tenant.status(),
        quotas: quotas_for(plan),
        tenant,
    })
}

pub async fn resolve(pool: &PgPool, tenant_id: i64) -> AppResult<ResolvedPlan> {
    let tenant = TenantRepository::find_by_id(pool, tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("tenant {}", tenant_id)))?;
    resolve_tenant(tenant)
}

/// Pure admit/deny against a lifetime usage count.
pub fn admits(limit: Option<i64>, used: i64) -> bool {
    match limit {
        None => true,
        Some(limit) => used < limit,
    }
}

/// Quota guard: count existing resources and admit iff below the plan limit.
/// The check-then-insert window for rooms and visitors is an accepted benign
/// race; bookings additionally serialize through the conflict transaction.
pub async fn ensure_capacity(
    pool: &PgPool,
    resolved: &ResolvedPlan,
    kind: QuotaKind,
) -> AppResult<()> {
    let limit = match kind {
        QuotaKind::Rooms => resolved.quotas.rooms,
        QuotaKind::Bookings => resolved.quotas.bookings,
        QuotaKind::Visitors => resolved.quotas.visitors,
    };
    let Some(limit) = limit else {
        return Ok(());
    };

    let tenant_id = resolved.tenant.id;
    let used = match kind {
        QuotaKind::Rooms => RoomRepository::count_by_tenant(pool, tenant_id).await?,
        QuotaKind::Bookings => BookingRepository::count_by_tenant(pool, tenant_id).await?,
        QuotaKind::Visitors => VisitorRepository::count_by_tenant(pool, tenant_id).await?,
    };

    if admits(Some(limit), used) {
        Ok(())
    } else {
        Err(AppError::QuotaExceeded {
            plan: resolved.plan.as_str().to_string(),
            limit,
            resource: kind.noun(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn tenant(plan: &str, status: &str) -> Tenant {
        let now = OffsetDateTime::now_utc();
        Tenant {
            id: 7,
            name: "Acme".into(),
            slug: "acme".into(),
            logo_url: None,
            plan: plan.into(),
            subscription_status: status.into(),
            trial_ends_at: None,
            subscription_ends_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn quota_table_matches_policy() {
        let trial = quotas_for(Plan::Trial);
        assert_eq!(trial.rooms, Some(2));
        assert_eq!(trial.bookings, Some(100));
        assert_eq!(trial.visitors, Some(100));

        let business = quotas_for(Plan::Business);
        assert_eq!(business.rooms, Some(6));
        assert_eq!(business.bookings, Some(1000));
        assert_eq!(business.visitors, None);

        let enterprise = quotas_for(Plan::Enterprise);
        assert_eq!(enterprise.rooms, None);
        assert_eq!(enterprise.bookings, None);
        assert_eq!(enterprise.visitors, None);
    }

    #[test]
    fn unknown_plan_and_status_normalize_to_defaults() {
        let t = tenant("platinum", "something-new");
        assert_eq!(t.plan(), Plan::Trial);
        assert_eq!(t.status(), SubscriptionStatus::Pending);
    }

    #[test]
    fn admit_is_monotonic_at_the_limit() {
        assert!(admits(Some(2), 0));
        assert!(admits(Some(2), 1));
        assert!(!admits(Some(2), 2));
        assert!(!admits(Some(2), 3));
    }

    #[test]
    fn unlimited_always_admits() {
        assert!(admits(None, 0));
        assert!(admits(None, 1_000_000));
    }

    #[test]
    fn pending_and_cancelled_are_inactive() {
        let now = OffsetDateTime::now_utc();
        for status in ["pending", "cancelled", "expired"] {
            let t = tenant("trial", status);
            assert!(matches!(
                check_gate(&t, now),
                Err(AppError::SubscriptionInactive)
            ));
        }
    }

    #[test]
    fn trial_requires_future_trial_end() {
        let now = OffsetDateTime::now_utc();

        let mut t = tenant("trial", "trial");
        assert!(matches!(check_gate(&t, now), Err(AppError::TrialExpired)));

        t.trial_ends_at = Some(now - Duration::seconds(1));
        assert!(matches!(check_gate(&t, now), Err(AppError::TrialExpired)));

        t.trial_ends_at = Some(now + Duration::days(7));
        assert!(check_gate(&t, now).is_ok());
    }

    #[test]
    fn active_requires_future_subscription_end() {
        let now = OffsetDateTime::now_utc();

        let mut t = tenant("business", "active");
        assert!(matches!(
            check_gate(&t, now),
            Err(AppError::SubscriptionExpired)
        ));

        t.subscription_ends_at = Some(now - Duration::days(1));
        assert!(matches!(
            check_gate(&t, now),
            Err(AppError::SubscriptionExpired)
        ));

        t.subscription_ends_at = Some(now + Duration::days(30));
        assert!(check_gate(&t, now).is_ok());
    }

    #[test]
    fn resolved_plan_carries_the_quota_row() {
        let now = OffsetDateTime::now_utc();
        let mut t = tenant("business", "active");
        t.subscription_ends_at = Some(now + Duration::days(30));

        let resolved = resolve_tenant(t).unwrap();
        assert_eq!(resolved.plan, Plan::Business);
        assert_eq!(resolved.quotas.rooms, Some(6));
        assert_eq!(resolved.quotas.visitors, None);
    }
}
