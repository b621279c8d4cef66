use aerodesk_core::{CheckInStore, CheckInTransaction, SegmentInfo, StoreError};
use aerodesk_shared::{BoardingPass, FareConditions};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::map_sqlx_error;

/// Check-in persistence. Each check-in runs in its own transaction taken from
/// the pool; the unique constraints on `boarding_passes` settle races.
pub struct PgCheckInStore {
    pool: PgPool,
}

impl PgCheckInStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct SegmentRow {
    ticket_no: String,
    flight_id: i32,
    aircraft_code: String,
    fare_conditions: String,
}

#[derive(sqlx::FromRow)]
struct BoardingPassRow {
    ticket_no: String,
    flight_id: i32,
    boarding_no: i32,
    seat_no: String,
}

impl From<BoardingPassRow> for BoardingPass {
    fn from(row: BoardingPassRow) -> Self {
        Self {
            ticket_no: row.ticket_no,
            flight_id: row.flight_id,
            boarding_no: row.boarding_no,
            seat_no: row.seat_no,
        }
    }
}

#[async_trait]
impl CheckInStore for PgCheckInStore {
    async fn begin(&self) -> Result<Box<dyn CheckInTransaction>, StoreError> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(PgCheckInTransaction { tx }))
    }
}

/// Rolled back on drop unless committed.
pub struct PgCheckInTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CheckInTransaction for PgCheckInTransaction {
    async fn find_segment(&mut self, ticket_no: &str, flight_id: i32) -> Result<Option<SegmentInfo>, StoreError> {
        let row = sqlx::query_as::<_, SegmentRow>(
            r#"
            SELECT tf.ticket_no, tf.flight_id, f.aircraft_code, tf.fare_conditions
            FROM ticket_flights tf
            JOIN flights f ON f.flight_id = tf.flight_id
            WHERE tf.ticket_no = $1 AND tf.flight_id = $2
            "#,
        )
        .bind(ticket_no)
        .bind(flight_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let fare_conditions = row
            .fare_conditions
            .parse::<FareConditions>()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Some(SegmentInfo {
            ticket_no: row.ticket_no,
            flight_id: row.flight_id,
            aircraft_code: row.aircraft_code,
            fare_conditions,
        }))
    }

    async fn find_boarding_pass(&mut self, ticket_no: &str, flight_id: i32) -> Result<Option<BoardingPass>, StoreError> {
        let row = sqlx::query_as::<_, BoardingPassRow>(
            "SELECT ticket_no, flight_id, boarding_no, seat_no FROM boarding_passes WHERE ticket_no = $1 AND flight_id = $2",
        )
        .bind(ticket_no)
        .bind(flight_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(BoardingPass::from))
    }

    async fn first_free_seat(&mut self, flight_id: i32, aircraft_code: &str) -> Result<Option<String>, StoreError> {
        // C collation gives byte order, independent of the database locale
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT s.seat_no
            FROM seats s
            WHERE s.aircraft_code = $2
              AND NOT EXISTS (
                  SELECT 1 FROM boarding_passes bp
                  WHERE bp.flight_id = $1 AND bp.seat_no = s.seat_no
              )
            ORDER BY s.seat_no COLLATE "C"
            LIMIT 1
            "#,
        )
        .bind(flight_id)
        .bind(aircraft_code)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)
    }

    async fn next_boarding_no(&mut self, flight_id: i32) -> Result<i32, StoreError> {
        sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE(MAX(boarding_no), 0) + 1 FROM boarding_passes WHERE flight_id = $1",
        )
        .bind(flight_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)
    }

    async fn insert_boarding_pass(&mut self, pass: &BoardingPass) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO boarding_passes (ticket_no, flight_id, boarding_no, seat_no)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&pass.ticket_no)
        .bind(pass.flight_id)
        .bind(pass.boarding_no)
        .bind(&pass.seat_no)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }
}
