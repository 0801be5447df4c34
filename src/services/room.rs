use sqlx::PgPool;

use crate::db::models::{NewRoom, Room, UpdateRoom};
use crate::db::repositories::RoomRepository;
use crate::error::{AppError, AppResult};
use crate::services::room_sync;
use crate::services::subscription::{self, QuotaKind};

/// Create a room under the plan quota. The room starts inactive and the
/// activation sync decides whether it becomes usable.
pub async fn create_room(pool: &PgPool, tenant_id: i64, payload: NewRoom) -> AppResult<Room> {
    let resolved = subscription::resolve(pool, tenant_id).await?;
    subscription::ensure_capacity(pool, &resolved, QuotaKind::Rooms).await?;

    let room = RoomRepository::insert(pool, tenant_id, &payload).await?;
    room_sync::sync_activation(pool, tenant_id, resolved.plan).await?;

    // Re-read for the post-sync activation state.
    let room = RoomRepository::find_by_id(pool, tenant_id, room.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("room {}", room.id)))?;
    Ok(room)
}

pub async fn list_rooms(pool: &PgPool, tenant_id: i64) -> AppResult<Vec<Room>> {
    Ok(RoomRepository::list_by_tenant(pool, tenant_id).await?)
}

/// Rename/capacity edits are rejected on rooms locked by the plan; locked
/// rooms stay listed and deletable.
pub async fn update_room(
    pool: &PgPool,
    tenant_id: i64,
    room_id: i64,
    payload: UpdateRoom,
) -> AppResult<Room> {
    let room = RoomRepository::find_by_id(pool, tenant_id, room_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("room {}", room_id)))?;
    if !room.is_active {
        return Err(AppError::RoomLocked);
    }

    Ok(RoomRepository::update_details(
        pool,
        tenant_id,
        room_id,
        payload.name.as_deref(),
        payload.capacity,
    )
    .await?)
}

/// A room with any booking history, current or past, is never deletable.
/// Lock state does not matter here.
pub async fn delete_room(pool: &PgPool, tenant_id: i64, room_id: i64) -> AppResult<()> {
    let room = RoomRepository::find_by_id(pool, tenant_id, room_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("room {}", room_id)))?;

    let bookings = RoomRepository::lifetime_booking_count(pool, room.id).await?;
    if bookings > 0 {
        return Err(AppError::Validation(
            "Room with booking history cannot be deleted".into(),
        ));
    }

    RoomRepository::delete(pool, tenant_id, room.id).await?;
    Ok(())
}

/// Explicit resync entry point; also the hook invoked when the billing
/// collaborator flips the tenant's plan.
pub async fn sync_rooms(pool: &PgPool, tenant_id: i64) -> AppResult<()> {
    let resolved = subscription::resolve(pool, tenant_id).await?;
    room_sync::sync_activation(pool, tenant_id, resolved.plan).await
}
