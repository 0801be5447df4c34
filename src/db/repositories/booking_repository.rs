use sqlx::{PgPool, Postgres, Transaction};
use time::{Date, Time};

use crate::db::models::Booking;

pub struct BookingRepository;

impl BookingRepository {
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: i64,
        room_id: i64,
        date: Date,
        start_time: Time,
        end_time: Time,
        booked_by: &str,
        contact_email: Option<&str>,
        purpose: Option<&str>,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings
                (tenant_id, room_id, booking_date, start_time, end_time,
                 booked_by, contact_email, purpose, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'BOOKED')
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(room_id)
        .bind(date)
        .bind(start_time)
        .bind(end_time)
        .bind(booked_by)
        .bind(contact_email)
        .bind(purpose)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: i64,
        id: i64,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Row-locked lookup inside the reschedule transaction, so concurrent
    /// reschedules of the same booking serialize.
    pub async fn find_by_id_for_update(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: i64,
        id: i64,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// First `BOOKED` row on the same room and date whose `[start, end)`
    /// window intersects the given one. `exclude_id` skips the booking being
    /// rescheduled.
    pub async fn find_overlapping(
        tx: &mut Transaction<'_, Postgres>,
        room_id: i64,
        date: Date,
        start_time: Time,
        end_time: Time,
        exclude_id: Option<i64>,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE room_id = $1
              AND booking_date = $2
              AND status = 'BOOKED'
              AND start_time < $4
              AND end_time > $3
              AND ($5::BIGINT IS NULL OR id <> $5)
            LIMIT 1
            "#,
        )
        .bind(room_id)
        .bind(date)
        .bind(start_time)
        .bind(end_time)
        .bind(exclude_id)
        .fetch_optional(&mut **tx)
        .await
    }

    pub async fn update_schedule(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: i64,
        id: i64,
        date: Date,
        start_time: Time,
        end_time: Time,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET booking_date = $1, start_time = $2, end_time = $3, updated_at = now()
            WHERE id = $4 AND tenant_id = $5
            RETURNING *
            "#,
        )
        .bind(date)
        .bind(start_time)
        .bind(end_time)
        .bind(id)
        .bind(tenant_id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Flip a `BOOKED` row to `CANCELLED`. Returns `None` when the booking is
    /// missing or already terminal.
    pub async fn cancel(
        pool: &PgPool,
        tenant_id: i64,
        id: i64,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = 'CANCELLED', updated_at = now()
            WHERE id = $1 AND tenant_id = $2 AND status = 'BOOKED'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_room_date(
        pool: &PgPool,
        tenant_id: i64,
        room_id: i64,
        date: Date,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE tenant_id = $1 AND room_id = $2 AND booking_date = $3
            ORDER BY start_time ASC
            "#,
        )
        .bind(tenant_id)
        .bind(room_id)
        .bind(date)
        .fetch_all(pool)
        .await
    }

    pub async fn count_by_tenant(pool: &PgPool, tenant_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(pool)
            .await
    }
}
