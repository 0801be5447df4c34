use sqlx::PgPool;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

use crate::collaborators::mail::{dispatch, FailurePolicy, MailMessage, Mailer};
use crate::db::models::{Booking, BookingStatus, NewBooking, RescheduleBooking};
use crate::db::repositories::{BookingRepository, RoomRepository};
use crate::error::{AppError, AppResult};
use crate::services::subscription::{self, QuotaKind};

/// Strict `H:MM AM/PM` parser: hour 1-12 without a required leading zero,
/// exactly two minute digits.
pub fn parse_time_12h(input: &str) -> AppResult<Time> {
    let invalid = || AppError::Validation(format!("Invalid time '{}', expected H:MM AM/PM", input));

    let (clock, meridiem) = input.trim().split_once(' ').ok_or_else(invalid)?;
    let is_pm = match meridiem.trim().to_ascii_uppercase().as_str() {
        "AM" => false,
        "PM" => true,
        _ => return Err(invalid()),
    };

    let (hour_str, minute_str) = clock.split_once(':').ok_or_else(invalid)?;
    if hour_str.is_empty()
        || hour_str.len() > 2
        || minute_str.len() != 2
        || !hour_str.chars().all(|c| c.is_ascii_digit())
        || !minute_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let hour: u8 = hour_str.parse().map_err(|_| invalid())?;
    let minute: u8 = minute_str.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return Err(invalid());
    }

    let hour24 = match (hour, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (hour, false) => hour,
        (hour, true) => hour + 12,
    };

    Time::from_hms(hour24, minute, 0).map_err(|_| invalid())
}

pub fn parse_date(input: &str) -> AppResult<Date> {
    Date::parse(input, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", input)))
}

/// Two `[start, end)` windows intersect. Mirrors the SQL predicate the
/// conflict query runs.
#[allow(unused)]
pub fn overlaps(existing: (Time, Time), candidate: (Time, Time)) -> bool {
    existing.0 < candidate.1 && existing.1 > candidate.0
}

pub fn format_time_24h(t: Time) -> String {
    format!("{:02}:{:02}", t.hour(), t.minute())
}

fn parse_window(date: &str, start: &str, end: &str) -> AppResult<(Date, Time, Time)> {
    let date = parse_date(date)?;
    let start = parse_time_12h(start)?;
    let end = parse_time_12h(end)?;
    if end <= start {
        return Err(AppError::Validation(
            "End time must be after start time".into(),
        ));
    }
    Ok((date, start, end))
}

pub async fn create_booking(
    pool: &PgPool,
    mailer: &dyn Mailer,
    tenant_id: i64,
    payload: NewBooking,
) -> AppResult<Booking> {
    let (date, start_time, end_time) =
        parse_window(&payload.date, &payload.start_time, &payload.end_time)?;

    let resolved = subscription::resolve(pool, tenant_id).await?;
    subscription::ensure_capacity(pool, &resolved, QuotaKind::Bookings).await?;

    // The transaction is the double-booking guard: the room-row lock
    // serializes concurrent attempts, and the overlap query re-evaluates
    // after the winner commits.
    let mut tx = pool.begin().await?;

    let room = RoomRepository::find_by_id_for_update(&mut tx, tenant_id, payload.room_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("room {}", payload.room_id)))?;
    if !room.is_active {
        return Err(AppError::RoomLocked);
    }

    if let Some(existing) =
        BookingRepository::find_overlapping(&mut tx, room.id, date, start_time, end_time, None)
            .await?
    {
        return Err(AppError::SlotConflict {
            start: format_time_24h(existing.start_time),
            end: format_time_24h(existing.end_time),
        });
    }

    let booking = BookingRepository::insert(
        &mut tx,
        tenant_id,
        room.id,
        date,
        start_time,
        end_time,
        &payload.booked_by,
        payload.contact_email.as_deref(),
        payload.purpose.as_deref(),
    )
    .await?;

    tx.commit().await?;

    notify(mailer, &booking, "Booking confirmed", &room.name).await?;

    Ok(booking)
}

pub async fn reschedule_booking(
    pool: &PgPool,
    mailer: &dyn Mailer,
    tenant_id: i64,
    booking_id: i64,
    payload: RescheduleBooking,
) -> AppResult<Booking> {
    let (date, start_time, end_time) =
        parse_window(&payload.date, &payload.start_time, &payload.end_time)?;

    subscription::resolve(pool, tenant_id).await?;

    let now = OffsetDateTime::now_utc();
    if date == now.date() && start_time <= now.time() {
        return Err(AppError::PastSchedule);
    }

    let mut tx = pool.begin().await?;

    let booking = BookingRepository::find_by_id_for_update(&mut tx, tenant_id, booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {}", booking_id)))?;
    if booking.status != BookingStatus::Booked.as_str() {
        return Err(AppError::NotFound(format!("active booking {}", booking_id)));
    }

    let room = RoomRepository::find_by_id_for_update(&mut tx, tenant_id, booking.room_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("room {}", booking.room_id)))?;

    if let Some(existing) = BookingRepository::find_overlapping(
        &mut tx,
        room.id,
        date,
        start_time,
        end_time,
        Some(booking.id),
    )
    .await?
    {
        return Err(AppError::SlotConflict {
            start: format_time_24h(existing.start_time),
            end: format_time_24h(existing.end_time),
        });
    }

    let updated =
        BookingRepository::update_schedule(&mut tx, tenant_id, booking.id, date, start_time, end_time)
            .await?;

    tx.commit().await?;

    notify(mailer, &updated, "Booking rescheduled", &room.name).await?;

    Ok(updated)
}

pub async fn cancel_booking(
    pool: &PgPool,
    mailer: &dyn Mailer,
    tenant_id: i64,
    booking_id: i64,
) -> AppResult<Booking> {
    let cancelled = BookingRepository::cancel(pool, tenant_id, booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("active booking {}", booking_id)))?;

    notify(mailer, &cancelled, "Booking cancelled", "").await?;

    Ok(cancelled)
}

pub async fn get_booking(pool: &PgPool, tenant_id: i64, booking_id: i64) -> AppResult<Booking> {
    BookingRepository::find_by_id(pool, tenant_id, booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {}", booking_id)))
}

pub async fn list_for_room(
    pool: &PgPool,
    tenant_id: i64,
    room_id: i64,
    date: Date,
) -> AppResult<Vec<Booking>> {
    Ok(BookingRepository::list_by_room_date(pool, tenant_id, room_id, date).await?)
}

/// Post-commit notification; failures are logged, never propagated back into
/// the already-committed booking.
async fn notify(
    mailer: &dyn Mailer,
    booking: &Booking,
    subject: &str,
    room_name: &str,
) -> AppResult<()> {
    let Some(to) = booking.contact_email.clone() else {
        return Ok(());
    };
    let body = format!(
        "<p>{} {} from {} to {} on {}.</p>",
        subject,
        if room_name.is_empty() {
            format!("for room #{}", booking.room_id)
        } else {
            format!("for {}", room_name)
        },
        format_time_24h(booking.start_time),
        format_time_24h(booking.end_time),
        booking.booking_date,
    );
    dispatch(
        mailer,
        FailurePolicy::LogAndContinue,
        MailMessage {
            to,
            subject: subject.to_string(),
            html_body: body,
        },
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::time;

    #[test]
    fn parses_morning_and_afternoon_times() {
        assert_eq!(parse_time_12h("9:00 AM").unwrap(), time!(9:00));
        assert_eq!(parse_time_12h("09:30 AM").unwrap(), time!(9:30));
        assert_eq!(parse_time_12h("1:05 PM").unwrap(), time!(13:05));
        assert_eq!(parse_time_12h("11:59 PM").unwrap(), time!(23:59));
    }

    #[test]
    fn noon_and_midnight_convert_correctly() {
        assert_eq!(parse_time_12h("12:00 AM").unwrap(), time!(0:00));
        assert_eq!(parse_time_12h("12:00 PM").unwrap(), time!(12:00));
        assert_eq!(parse_time_12h("12:30 AM").unwrap(), time!(0:30));
    }

    #[test]
    fn rejects_malformed_times() {
        for input in [
            "13:00 PM", "0:30 AM", "10:5 PM", "10:30", "10:30 XM", "10;30 AM", "", " PM",
            "10:60 AM", "100:30 AM",
        ] {
            assert!(
                matches!(parse_time_12h(input), Err(AppError::Validation(_))),
                "expected rejection for {:?}",
                input
            );
        }
    }

    #[test]
    fn meridiem_is_case_insensitive() {
        assert_eq!(parse_time_12h("9:00 am").unwrap(), time!(9:00));
        assert_eq!(parse_time_12h("9:00 pm").unwrap(), time!(21:00));
    }

    #[test]
    fn window_requires_end_after_start() {
        assert!(parse_window("2024-01-10", "10:00 AM", "11:00 AM").is_ok());
        assert!(matches!(
            parse_window("2024-01-10", "11:00 AM", "11:00 AM"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_window("2024-01-10", "2:00 PM", "10:00 AM"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date("2024-01-10").is_ok());
        assert!(parse_date("01/10/2024").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }

    #[test]
    fn overlap_predicate_matches_booked_windows() {
        let existing = (time!(10:00), time!(11:00));
        // straddles the tail
        assert!(overlaps(existing, (time!(10:30), time!(11:30))));
        // fully contained
        assert!(overlaps(existing, (time!(10:15), time!(10:45))));
        // containing
        assert!(overlaps(existing, (time!(9:00), time!(12:00))));
        // touching windows do not conflict
        assert!(!overlaps(existing, (time!(11:00), time!(12:00))));
        assert!(!overlaps(existing, (time!(9:00), time!(10:00))));
        // disjoint
        assert!(!overlaps(existing, (time!(12:00), time!(13:00))));
    }

    #[test]
    fn formats_24h_with_zero_padding() {
        assert_eq!(format_time_24h(time!(9:05)), "09:05");
        assert_eq!(format_time_24h(time!(23:59)), "23:59");
    }
}
