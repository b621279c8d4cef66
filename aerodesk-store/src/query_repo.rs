use aerodesk_core::{QueryRepository, StoreError};
use aerodesk_shared::{Airport, AirportSummary, InboundRoute, OutboundRoute};
use async_trait::async_trait;
use chrono::NaiveTime;
use sqlx::PgPool;

use crate::error::map_sqlx_error;

/// Read-only queries. Localized jsonb columns are read in `lang`, falling back
/// to English when a translation is missing.
pub struct PgQueryRepository {
    pool: PgPool,
    lang: String,
}

impl PgQueryRepository {
    pub fn new(pool: PgPool, lang: impl Into<String>) -> Self {
        Self { pool, lang: lang.into() }
    }
}

#[derive(sqlx::FromRow)]
struct AirportRow {
    code: String,
    name: String,
    city: String,
}

#[derive(sqlx::FromRow)]
struct OutboundRow {
    flight_no: String,
    arrival_airport: String,
    departure_time: NaiveTime,
    days_of_week: Vec<i32>,
}

#[derive(sqlx::FromRow)]
struct InboundRow {
    flight_no: String,
    departure_airport: String,
    arrival_time: NaiveTime,
    days_of_week: Vec<i32>,
}

#[async_trait]
impl QueryRepository for PgQueryRepository {
    async fn list_cities(&self) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT COALESCE(city ->> $1, city ->> 'en') AS city
            FROM airports_data
            ORDER BY 1
            "#,
        )
        .bind(&self.lang)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_airports(&self) -> Result<Vec<Airport>, StoreError> {
        let rows = sqlx::query_as::<_, AirportRow>(
            r#"
            SELECT airport_code AS code,
                   COALESCE(airport_name ->> $1, airport_name ->> 'en') AS name,
                   COALESCE(city ->> $1, city ->> 'en') AS city
            FROM airports_data
            ORDER BY city, code
            "#,
        )
        .bind(&self.lang)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| Airport {
                city: row.city,
                code: row.code,
                name: row.name,
            })
            .collect())
    }

    async fn airports_in_city(&self, city_pattern: &str) -> Result<Vec<AirportSummary>, StoreError> {
        let rows = sqlx::query_as::<_, AirportRow>(
            r#"
            SELECT airport_code AS code,
                   COALESCE(airport_name ->> $1, airport_name ->> 'en') AS name,
                   COALESCE(city ->> $1, city ->> 'en') AS city
            FROM airports_data
            WHERE COALESCE(city ->> $1, city ->> 'en') LIKE $2
            ORDER BY airport_code
            "#,
        )
        .bind(&self.lang)
        .bind(city_pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| AirportSummary { code: row.code, name: row.name })
            .collect())
    }

    async fn outbound_routes(&self, airport_code: &str) -> Result<Vec<OutboundRoute>, StoreError> {
        let rows = sqlx::query_as::<_, OutboundRow>(
            r#"
            SELECT flight_no, arrival_airport, departure_time, days_of_week
            FROM routes
            WHERE departure_airport = $1
            ORDER BY flight_no, arrival_airport
            "#,
        )
        .bind(airport_code)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| OutboundRoute {
                flight_no: row.flight_no,
                arrival_airport: row.arrival_airport,
                departure_time: row.departure_time,
                days_of_week: row.days_of_week,
            })
            .collect())
    }

    async fn inbound_routes(&self, airport_code: &str) -> Result<Vec<InboundRoute>, StoreError> {
        let rows = sqlx::query_as::<_, InboundRow>(
            r#"
            SELECT flight_no, departure_airport, arrival_time, days_of_week
            FROM routes
            WHERE arrival_airport = $1
            ORDER BY flight_no, departure_airport
            "#,
        )
        .bind(airport_code)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| InboundRoute {
                flight_no: row.flight_no,
                departure_airport: row.departure_airport,
                arrival_time: row.arrival_time,
                days_of_week: row.days_of_week,
            })
            .collect())
    }
}
