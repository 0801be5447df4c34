use sqlx::{PgPool, Postgres, Transaction};

use crate::db::models::{NewRoom, Room};

pub struct RoomRepository;

impl RoomRepository {
    pub async fn insert(
        pool: &PgPool,
        tenant_id: i64,
        data: &NewRoom,
    ) -> Result<Room, sqlx::Error> {
        // Rooms start inactive; activation is decided by the plan sync.
        sqlx::query_as::<_, Room>(
            r#"
            INSERT INTO rooms (tenant_id, room_number, name, capacity, is_active)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(data.room_number)
        .bind(&data.name)
        .bind(data.capacity)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: i64,
        id: i64,
    ) -> Result<Option<Room>, sqlx::Error> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Row-locked lookup, used inside the booking transaction so that
    /// concurrent bookings for the same room serialize on the room row.
    pub async fn find_by_id_for_update(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: i64,
        id: i64,
    ) -> Result<Option<Room>, sqlx::Error> {
        sqlx::query_as::<_, Room>(
            "SELECT * FROM rooms WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&mut **tx)
        .await
    }

    pub async fn list_by_tenant(pool: &PgPool, tenant_id: i64) -> Result<Vec<Room>, sqlx::Error> {
        sqlx::query_as::<_, Room>(
            "SELECT * FROM rooms WHERE tenant_id = $1 ORDER BY room_number ASC, id ASC",
        )
        .bind(tenant_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count_by_tenant(pool: &PgPool, tenant_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rooms WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(pool)
            .await
    }

    pub async fn update_details(
        pool: &PgPool,
        tenant_id: i64,
        id: i64,
        name: Option<&str>,
        capacity: Option<i32>,
    ) -> Result<Room, sqlx::Error> {
        sqlx::query_as::<_, Room>(
            r#"
            UPDATE rooms
            SET
                name = COALESCE($1, name),
                capacity = COALESCE($2, capacity),
                updated_at = now()
            WHERE id = $3 AND tenant_id = $4
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(capacity)
        .bind(id)
        .bind(tenant_id)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, tenant_id: i64, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Lifetime booking count for a room, regardless of status. A room with
    /// any booking history is never deletable.
    pub async fn lifetime_booking_count(pool: &PgPool, room_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE room_id = $1")
            .bind(room_id)
            .fetch_one(pool)
            .await
    }

    pub async fn deactivate_all(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE rooms SET is_active = FALSE, updated_at = now() WHERE tenant_id = $1")
            .bind(tenant_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn activate_all(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE rooms SET is_active = TRUE, updated_at = now() WHERE tenant_id = $1")
            .bind(tenant_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Activate the first `limit` rooms in `(room_number, id)` order.
    pub async fn activate_first(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: i64,
        limit: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE rooms SET is_active = TRUE, updated_at = now()
            WHERE id IN (
                SELECT id FROM rooms
                WHERE tenant_id = $1
                ORDER BY room_number ASC, id ASC
                LIMIT $2
            )
            "#,
        )
        .bind(tenant_id)
        .bind(limit)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
