use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use scm_core::repository::BookingRepository;
use scm_core::{CoreError, CoreResult};
use scm_shared::{BookingId, BookingRequest};
use sqlx::PgPool;

use crate::errors::classify;

const COLUMNS: &str = "id, unit, details, date, start_time, end_time, status, requested_at, wa_message_id";

pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct BookingRow {
    id: String,
    unit: String,
    details: String,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    status: String,
    requested_at: DateTime<Utc>,
    wa_message_id: Option<String>,
}

impl TryFrom<BookingRow> for BookingRequest {
    type Error = CoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(BookingRequest {
            id: BookingId(row.id),
            unit: row.unit.parse().map_err(|e| CoreError::InternalError(format!("Corrupt row: {}", e)))?,
            details: row.details,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status.parse().map_err(|e| CoreError::InternalError(format!("Corrupt row: {}", e)))?,
            requested_at: row.requested_at,
            wa_message_id: row.wa_message_id,
        })
    }
}

pub(crate) async fn fetch_booking(pool: &PgPool, id: &str) -> CoreResult<Option<BookingRequest>> {
    let row: Option<BookingRow> = sqlx::query_as(&format!("SELECT {} FROM bookings WHERE id = $1", COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(classify)?;

    row.map(BookingRequest::try_from).transpose()
}

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn list_bookings(&self) -> CoreResult<Vec<BookingRequest>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings ORDER BY requested_at DESC, id DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        rows.into_iter().map(BookingRequest::try_from).collect()
    }

    async fn get_booking(&self, id: &BookingId) -> CoreResult<Option<BookingRequest>> {
        fetch_booking(&self.pool, id.as_str()).await
    }

    async fn insert_booking(&self, booking: &BookingRequest) -> CoreResult<BookingRequest> {
        let row: BookingRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO bookings (id, unit, details, date, start_time, end_time, status, requested_at, wa_message_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(booking.id.as_str())
        .bind(booking.unit.label())
        .bind(&booking.details)
        .bind(booking.date)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.status.label())
        .bind(booking.requested_at)
        .bind(booking.wa_message_id.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;

        row.try_into()
    }

    async fn update_booking(&self, booking: &BookingRequest) -> CoreResult<BookingRequest> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            r#"
            UPDATE bookings
            SET unit = $2, details = $3, date = $4, start_time = $5, end_time = $6,
                status = $7, wa_message_id = $8
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(booking.id.as_str())
        .bind(booking.unit.label())
        .bind(&booking.details)
        .bind(booking.date)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.status.label())
        .bind(booking.wa_message_id.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?;

        match row {
            Some(row) => row.try_into(),
            None => Err(CoreError::NotFound(format!("Booking {}", booking.id))),
        }
    }

    async fn delete_booking(&self, id: &BookingId) -> CoreResult<Option<u64>> {
        let mut tx = self.pool.begin().await.map_err(classify)?;

        let booking = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(classify)?;
        if booking.rows_affected() == 0 {
            tx.rollback().await.map_err(classify)?;
            return Ok(None);
        }

        let notifications = sqlx::query("DELETE FROM notifications WHERE request_id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(classify)?;

        tx.commit().await.map_err(classify)?;
        Ok(Some(notifications.rows_affected()))
    }

    async fn ping(&self) -> CoreResult<()> {
        sqlx::query("SELECT id FROM bookings LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }
}
