use sqlx::PgPool;

use crate::db::models::Plan;
use crate::db::repositories::RoomRepository;
use crate::error::AppResult;
use crate::services::subscription::quotas_for;

/// Full activation resync for a tenant: deactivate everything, then activate
/// what the plan allows, lowest `(room_number, id)` first. Idempotent, and
/// run after room creation, explicit sync requests, and plan-change events
/// from the billing collaborator.
///
/// The per-tenant advisory lock keeps two concurrent syncs from interleaving
/// their deactivate/activate phases.
pub async fn sync_activation(pool: &PgPool, tenant_id: i64, plan: Plan) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(tenant_id)
        .execute(&mut *tx)
        .await?;

    RoomRepository::deactivate_all(&mut tx, tenant_id).await?;

    match quotas_for(plan).rooms {
        None => RoomRepository::activate_all(&mut tx, tenant_id).await?,
        Some(limit) => RoomRepository::activate_first(&mut tx, tenant_id, limit).await?,
    }

    tx.commit().await?;
    Ok(())
}

/// Which room ids survive a sync for a given plan limit, in activation order.
/// Mirrors the SQL selection and exists for the ordering rule to be testable
/// without a database.
#[allow(unused)]
pub fn select_active(rooms: &[(i32, i64)], limit: Option<i64>) -> Vec<i64> {
    let mut sorted: Vec<(i32, i64)> = rooms.to_vec();
    sorted.sort_by_key(|&(room_number, id)| (room_number, id));
    let take = limit.map_or(sorted.len(), |l| l.max(0) as usize);
    sorted.into_iter().take(take).map(|(_, id)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downgrade_keeps_lowest_room_numbers() {
        // rooms numbered 1-5, plan limit 2: rooms 1 and 2 stay active
        let rooms = vec![(3, 30), (1, 10), (5, 50), (2, 20), (4, 40)];
        assert_eq!(select_active(&rooms, Some(2)), vec![10, 20]);
    }

    #[test]
    fn ties_on_room_number_break_by_id() {
        let rooms = vec![(1, 12), (1, 11), (2, 20)];
        assert_eq!(select_active(&rooms, Some(2)), vec![11, 12]);
    }

    #[test]
    fn unlimited_activates_everything() {
        let rooms = vec![(2, 20), (1, 10)];
        assert_eq!(select_active(&rooms, None), vec![10, 20]);
    }

    #[test]
    fn limit_beyond_count_activates_everything() {
        let rooms = vec![(2, 20), (1, 10)];
        assert_eq!(select_active(&rooms, Some(6)), vec![10, 20]);
    }

    #[test]
    fn selection_is_idempotent() {
        let rooms = vec![(1, 10), (2, 20), (3, 30)];
        let first = select_active(&rooms, Some(2));
        let again = select_active(&rooms, Some(2));
        assert_eq!(first, again);
    }
}
