use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use aerodesk_shared::models::booking::{
    BOARDING_PASSES_BOARDING_NO_KEY, BOARDING_PASSES_PKEY, BOARDING_PASSES_SEAT_KEY, BOARDING_PASSES_SEGMENT_FKEY,
};
use aerodesk_shared::{
    Aircraft, Airport, AirportSummary, BoardingPass, FareConditions, Flight, InboundRoute, OutboundRoute, Seat,
    TicketFlight,
};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveTime, Utc};
use tokio::sync::Mutex;

use crate::repository::{CheckInStore, CheckInTransaction, QueryRepository, SegmentInfo, StoreError};

/// In-process store holding the same tables and constraints as the Postgres
/// schema. Boarding-pass constraints are checked when a row is inserted and
/// again, atomically, when the transaction commits.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    airports: BTreeMap<String, Airport>,
    aircraft: BTreeMap<String, Aircraft>,
    // aircraft_code -> seat_no -> seat; String ordering is byte order
    seats: BTreeMap<String, BTreeMap<String, Seat>>,
    flights: BTreeMap<i32, Flight>,
    segments: HashMap<(String, i32), TicketFlight>,
    // keyed by (flight_id, ticket_no)
    boarding_passes: BTreeMap<(i32, String), BoardingPass>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_airport(&self, code: &str, name: &str, city: &str) {
        let mut tables = self.tables.lock().await;
        tables.airports.insert(
            code.to_string(),
            Airport {
                city: city.to_string(),
                code: code.to_string(),
                name: name.to_string(),
            },
        );
    }

    pub async fn add_aircraft(&self, aircraft_code: &str, model: &str, range_km: i32) -> Result<(), StoreError> {
        if range_km <= 0 {
            return Err(StoreError::CheckViolation {
                constraint: "aircrafts_range_check".to_string(),
                message: format!("aircraft {} must have a positive range", aircraft_code),
            });
        }
        let mut tables = self.tables.lock().await;
        tables.aircraft.insert(
            aircraft_code.to_string(),
            Aircraft {
                aircraft_code: aircraft_code.to_string(),
                model: model.to_string(),
                range_km,
            },
        );
        Ok(())
    }

    pub async fn add_seat(
        &self,
        aircraft_code: &str,
        seat_no: &str,
        fare_conditions: FareConditions,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if !tables.aircraft.contains_key(aircraft_code) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "seats_aircraft_code_fkey".to_string(),
                message: format!("aircraft {} does not exist", aircraft_code),
            });
        }
        let seat_map = tables.seats.entry(aircraft_code.to_string()).or_default();
        if seat_map.contains_key(seat_no) {
            return Err(unique_violation("seats_pkey"));
        }
        seat_map.insert(seat_no.to_string(), Seat::new(aircraft_code, seat_no, fare_conditions));
        Ok(())
    }

    pub async fn add_flight(&self, flight: Flight) -> Result<(), StoreError> {
        flight.validate_schedule().map_err(|e| StoreError::CheckViolation {
            constraint: "flights_check".to_string(),
            message: e.to_string(),
        })?;
        let mut tables = self.tables.lock().await;
        if !tables.aircraft.contains_key(&flight.aircraft_code) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "flights_aircraft_code_fkey".to_string(),
                message: format!("aircraft {} does not exist", flight.aircraft_code),
            });
        }
        if tables.flights.contains_key(&flight.flight_id) {
            return Err(unique_violation("flights_pkey"));
        }
        tables.flights.insert(flight.flight_id, flight);
        Ok(())
    }

    pub async fn add_segment(
        &self,
        ticket_no: &str,
        flight_id: i32,
        fare_conditions: FareConditions,
        amount: f64,
    ) -> Result<(), StoreError> {
        if amount < 0.0 {
            return Err(StoreError::CheckViolation {
                constraint: "ticket_flights_amount_check".to_string(),
                message: format!("negative fare for ticket {}", ticket_no),
            });
        }
        let mut tables = self.tables.lock().await;
        if !tables.flights.contains_key(&flight_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "ticket_flights_flight_id_fkey".to_string(),
                message: format!("flight {} does not exist", flight_id),
            });
        }
        let key = (ticket_no.to_string(), flight_id);
        if tables.segments.contains_key(&key) {
            return Err(unique_violation("ticket_flights_pkey"));
        }
        tables.segments.insert(
            key,
            TicketFlight {
                ticket_no: ticket_no.to_string(),
                flight_id,
                fare_conditions,
                amount,
            },
        );
        Ok(())
    }

    /// Committed boarding passes for a flight, ordered by ticket number.
    pub async fn boarding_passes(&self, flight_id: i32) -> Vec<BoardingPass> {
        let tables = self.tables.lock().await;
        tables
            .boarding_passes
            .range((flight_id, String::new())..)
            .take_while(|((id, _), _)| *id == flight_id)
            .map(|(_, pass)| pass.clone())
            .collect()
    }
}

fn unique_violation(constraint: &str) -> StoreError {
    StoreError::UniqueViolation {
        constraint: constraint.to_string(),
        message: format!("duplicate key value violates unique constraint \"{}\"", constraint),
    }
}

impl Tables {
    /// Same checks, in the same order, as the boarding_passes table definition.
    fn check_boarding_pass(&self, pass: &BoardingPass, staged: &[BoardingPass]) -> Result<(), StoreError> {
        if !self.segments.contains_key(&(pass.ticket_no.clone(), pass.flight_id)) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: BOARDING_PASSES_SEGMENT_FKEY.to_string(),
                message: format!(
                    "insert or update on table \"boarding_passes\" violates foreign key constraint \"{}\"",
                    BOARDING_PASSES_SEGMENT_FKEY
                ),
            });
        }

        let same_flight = self
            .boarding_passes
            .values()
            .chain(staged.iter())
            .filter(|existing| existing.flight_id == pass.flight_id);

        for existing in same_flight {
            if existing.ticket_no == pass.ticket_no {
                return Err(unique_violation(BOARDING_PASSES_PKEY));
            }
            if existing.seat_no == pass.seat_no {
                return Err(unique_violation(BOARDING_PASSES_SEAT_KEY));
            }
            if existing.boarding_no == pass.boarding_no {
                return Err(unique_violation(BOARDING_PASSES_BOARDING_NO_KEY));
            }
        }
        Ok(())
    }

    fn passes_for<'a>(&'a self, flight_id: i32, staged: &'a [BoardingPass]) -> impl Iterator<Item = &'a BoardingPass> {
        self.boarding_passes
            .values()
            .chain(staged.iter())
            .filter(move |pass| pass.flight_id == flight_id)
    }
}

pub struct MemoryTransaction {
    tables: Arc<Mutex<Tables>>,
    staged: Vec<BoardingPass>,
}

#[async_trait]
impl CheckInStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn CheckInTransaction>, StoreError> {
        Ok(Box::new(MemoryTransaction {
            tables: self.tables.clone(),
            staged: Vec::new(),
        }))
    }
}

#[async_trait]
impl CheckInTransaction for MemoryTransaction {
    async fn find_segment(&mut self, ticket_no: &str, flight_id: i32) -> Result<Option<SegmentInfo>, StoreError> {
        let tables = self.tables.lock().await;
        let Some(segment) = tables.segments.get(&(ticket_no.to_string(), flight_id)) else {
            return Ok(None);
        };
        let flight = tables
            .flights
            .get(&flight_id)
            .ok_or_else(|| StoreError::Backend(format!("segment references missing flight {}", flight_id)))?;

        Ok(Some(SegmentInfo {
            ticket_no: segment.ticket_no.clone(),
            flight_id,
            aircraft_code: flight.aircraft_code.clone(),
            fare_conditions: segment.fare_conditions,
        }))
    }

    async fn find_boarding_pass(&mut self, ticket_no: &str, flight_id: i32) -> Result<Option<BoardingPass>, StoreError> {
        let tables = self.tables.lock().await;
        let found = tables
            .passes_for(flight_id, &self.staged)
            .find(|pass| pass.ticket_no == ticket_no)
            .cloned();
        Ok(found)
    }

    async fn first_free_seat(&mut self, flight_id: i32, aircraft_code: &str) -> Result<Option<String>, StoreError> {
        let tables = self.tables.lock().await;
        let taken: BTreeSet<&str> = tables
            .passes_for(flight_id, &self.staged)
            .map(|pass| pass.seat_no.as_str())
            .collect();

        Ok(tables
            .seats
            .get(aircraft_code)
            .and_then(|seat_map| seat_map.keys().find(|seat_no| !taken.contains(seat_no.as_str())))
            .cloned())
    }

    async fn next_boarding_no(&mut self, flight_id: i32) -> Result<i32, StoreError> {
        let tables = self.tables.lock().await;
        let max = tables
            .passes_for(flight_id, &self.staged)
            .map(|pass| pass.boarding_no)
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    async fn insert_boarding_pass(&mut self, pass: &BoardingPass) -> Result<(), StoreError> {
        let tables = self.tables.lock().await;
        tables.check_boarding_pass(pass, &self.staged)?;
        drop(tables);
        self.staged.push(pass.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTransaction { tables, staged } = *self;
        let mut tables = tables.lock().await;
        // All-or-nothing: validate every staged row before applying any
        for (i, pass) in staged.iter().enumerate() {
            tables.check_boarding_pass(pass, &staged[..i])?;
        }
        for pass in staged {
            tables
                .boarding_passes
                .insert((pass.flight_id, pass.ticket_no.clone()), pass);
        }
        Ok(())
    }
}

#[async_trait]
impl QueryRepository for MemoryStore {
    async fn list_cities(&self) -> Result<Vec<String>, StoreError> {
        let tables = self.tables.lock().await;
        let cities: BTreeSet<String> = tables.airports.values().map(|a| a.city.clone()).collect();
        Ok(cities.into_iter().collect())
    }

    async fn list_airports(&self) -> Result<Vec<Airport>, StoreError> {
        let tables = self.tables.lock().await;
        let mut airports: Vec<Airport> = tables.airports.values().cloned().collect();
        airports.sort_by(|a, b| a.city.cmp(&b.city).then_with(|| a.code.cmp(&b.code)));
        Ok(airports)
    }

    async fn airports_in_city(&self, city_pattern: &str) -> Result<Vec<AirportSummary>, StoreError> {
        let tables = self.tables.lock().await;
        // airports is keyed by code, so iteration order is already by code
        Ok(tables
            .airports
            .values()
            .filter(|a| like_match(city_pattern, &a.city))
            .cloned()
            .map(AirportSummary::from)
            .collect())
    }

    async fn outbound_routes(&self, airport_code: &str) -> Result<Vec<OutboundRoute>, StoreError> {
        let tables = self.tables.lock().await;
        let routes = group_routes(
            tables.flights.values().filter(|f| f.departure_airport == airport_code),
            |f| f.arrival_airport.clone(),
            |f| f.scheduled_departure,
        );
        Ok(routes
            .into_iter()
            .map(|((flight_no, arrival_airport), (departure_time, days))| OutboundRoute {
                flight_no,
                arrival_airport,
                departure_time,
                days_of_week: days.into_iter().collect(),
            })
            .collect())
    }

    async fn inbound_routes(&self, airport_code: &str) -> Result<Vec<InboundRoute>, StoreError> {
        let tables = self.tables.lock().await;
        let routes = group_routes(
            tables.flights.values().filter(|f| f.arrival_airport == airport_code),
            |f| f.departure_airport.clone(),
            |f| f.scheduled_arrival,
        );
        Ok(routes
            .into_iter()
            .map(|((flight_no, departure_airport), (arrival_time, days))| InboundRoute {
                flight_no,
                departure_airport,
                arrival_time,
                days_of_week: days.into_iter().collect(),
            })
            .collect())
    }
}

type RouteGroups = BTreeMap<(String, String), (NaiveTime, BTreeSet<i32>)>;

/// Folds flight instances into routes keyed by (flight_no, other airport).
/// The time of day is that of the earliest `instant` seen for the route, so
/// departure and arrival times are each the minimum of their own column.
fn group_routes<'a>(
    flights: impl Iterator<Item = &'a Flight>,
    other_airport: impl Fn(&Flight) -> String,
    instant: impl Fn(&Flight) -> DateTime<Utc>,
) -> RouteGroups {
    let mut earliest: BTreeMap<(String, String), (DateTime<Utc>, BTreeSet<i32>)> = BTreeMap::new();

    for flight in flights {
        let key = (flight.flight_no.clone(), other_airport(flight));
        let weekday = flight.scheduled_departure.weekday().number_from_monday() as i32;
        let at = instant(flight);
        let entry = earliest.entry(key).or_insert_with(|| (at, BTreeSet::new()));
        entry.0 = entry.0.min(at);
        entry.1.insert(weekday);
    }

    earliest
        .into_iter()
        .map(|(key, (at, days))| (key, (at.time(), days)))
        .collect()
}

#[derive(Clone, Copy, PartialEq)]
enum LikeToken {
    AnyRun,
    AnyOne,
    Literal(char),
}

/// Splits a `LIKE` pattern into tokens. `\` escapes the next character, as
/// Postgres does by default; a trailing lone `\` never matches.
fn like_tokens(pattern: &str) -> Option<Vec<LikeToken>> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => LikeToken::AnyRun,
            '_' => LikeToken::AnyOne,
            '\\' => LikeToken::Literal(chars.next()?),
            c => LikeToken::Literal(c),
        });
    }
    Some(tokens)
}

/// SQL `LIKE`: `%` matches any run of characters, `_` exactly one.
fn like_match(pattern: &str, text: &str) -> bool {
    let Some(p) = like_tokens(pattern) else {
        return false;
    };
    let t: Vec<char> = text.chars().collect();
    let mut dp = vec![vec![false; t.len() + 1]; p.len() + 1];
    dp[0][0] = true;

    for i in 1..=p.len() {
        if p[i - 1] == LikeToken::AnyRun {
            dp[i][0] = dp[i - 1][0];
        }
        for j in 1..=t.len() {
            dp[i][j] = match p[i - 1] {
                LikeToken::AnyRun => dp[i - 1][j] || dp[i][j - 1],
                LikeToken::AnyOne => dp[i - 1][j - 1],
                LikeToken::Literal(c) => dp[i - 1][j - 1] && c == t[j - 1],
            };
        }
    }
    dp[p.len()][t.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerodesk_shared::FlightStatus;
    use chrono::{Duration, TimeZone, Utc};

    fn flight(flight_id: i32, flight_no: &str, from: &str, to: &str, day: u32, hour: u32) -> Flight {
        let departure = Utc.with_ymd_and_hms(2017, 8, day, hour, 30, 0).unwrap();
        Flight {
            flight_id,
            flight_no: flight_no.to_string(),
            scheduled_departure: departure,
            scheduled_arrival: departure + Duration::minutes(95),
            departure_airport: from.to_string(),
            arrival_airport: to.to_string(),
            status: FlightStatus::Scheduled,
            aircraft_code: "SU9".to_string(),
            actual_departure: None,
            actual_arrival: None,
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.add_aircraft("SU9", "Sukhoi Superjet-100", 3000).await.unwrap();
        store.add_airport("SVO", "Sheremetyevo International Airport", "Moscow").await;
        store.add_airport("DME", "Domodedovo International Airport", "Moscow").await;
        store.add_airport("LED", "Pulkovo Airport", "St. Petersburg").await;
        store.add_airport("KZN", "Kazan International Airport", "Kazan").await;
        // 2017-08-14 is a Monday
        store.add_flight(flight(1, "PG0403", "DME", "LED", 14, 8)).await.unwrap();
        store.add_flight(flight(2, "PG0403", "DME", "LED", 16, 8)).await.unwrap();
        store.add_flight(flight(3, "PG0404", "DME", "KZN", 15, 11)).await.unwrap();
        store.add_flight(flight(4, "PG0405", "LED", "DME", 14, 17)).await.unwrap();
        store
    }

    #[test]
    fn test_like_match() {
        assert!(like_match("Moscow", "Moscow"));
        assert!(like_match("Mos%", "Moscow"));
        assert!(like_match("%burg", "St. Petersburg"));
        assert!(like_match("K_zan", "Kazan"));
        assert!(!like_match("moscow", "Moscow"));
        assert!(!like_match("Mos", "Moscow"));
        assert!(like_match("%", ""));
    }

    #[test]
    fn test_like_match_backslash_escapes() {
        assert!(like_match("Mos\\%", "Mos%"));
        assert!(!like_match("Mos\\%", "Moscow"));
        assert!(like_match("K\\_zan", "K_zan"));
        assert!(!like_match("K\\_zan", "Kazan"));
        assert!(like_match("a\\\\b", "a\\b"));
        assert!(!like_match("Moscow\\", "Moscow\\"));
    }

    #[tokio::test]
    async fn test_city_and_airport_listing() {
        let store = seeded().await;

        assert_eq!(store.list_cities().await.unwrap(), vec!["Kazan", "Moscow", "St. Petersburg"]);

        let codes: Vec<String> = store.list_airports().await.unwrap().into_iter().map(|a| a.code).collect();
        assert_eq!(codes, vec!["KZN", "DME", "SVO", "LED"]);

        let moscow = store.airports_in_city("Moscow").await.unwrap();
        assert_eq!(moscow.len(), 2);
        assert_eq!(moscow[0].code, "DME");
        assert!(store.airports_in_city("Paris").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_routes_are_grouped_by_flight_number() {
        let store = seeded().await;

        let outbound = store.outbound_routes("DME").await.unwrap();
        assert_eq!(outbound.len(), 2);
        assert_eq!(outbound[0].flight_no, "PG0403");
        assert_eq!(outbound[0].arrival_airport, "LED");
        assert_eq!(outbound[0].departure_time, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(outbound[0].days_of_week, vec![1, 3]);

        let inbound = store.inbound_routes("DME").await.unwrap();
        assert_eq!(inbound.len(), 1);
        assert_eq!(inbound[0].departure_airport, "LED");
        assert_eq!(inbound[0].arrival_time, NaiveTime::from_hms_opt(19, 5, 0).unwrap());

        assert!(store.outbound_routes("KZN").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_route_times_are_minimum_of_each_column() {
        let store = seeded().await;
        let mut slow = flight(10, "PG0500", "KZN", "SVO", 14, 8);
        slow.scheduled_arrival = slow.scheduled_departure + Duration::hours(5);
        let fast = flight(11, "PG0500", "KZN", "SVO", 14, 9);
        store.add_flight(slow).await.unwrap();
        store.add_flight(fast).await.unwrap();

        let outbound = store.outbound_routes("KZN").await.unwrap();
        assert_eq!(outbound[0].departure_time, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(outbound[0].days_of_week, vec![1]);

        // earliest arrival belongs to the later departure
        let inbound = store.inbound_routes("SVO").await.unwrap();
        assert_eq!(inbound.len(), 1);
        assert_eq!(inbound[0].arrival_time, NaiveTime::from_hms_opt(11, 5, 0).unwrap());
    }

    #[tokio::test]
    async fn test_seeding_enforces_references() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.add_seat("777", "1A", FareConditions::Business).await,
            Err(StoreError::ForeignKeyViolation { .. })
        ));
        assert!(matches!(
            store.add_segment("0005432000987", 99, FareConditions::Economy, 100.0).await,
            Err(StoreError::ForeignKeyViolation { .. })
        ));
        assert!(store.add_aircraft("773", "Boeing 777-300", 0).await.is_err());

        store.add_aircraft("SU9", "Sukhoi Superjet-100", 3000).await.unwrap();
        let mut bad = flight(7, "PG0001", "DME", "LED", 14, 8);
        bad.scheduled_arrival = bad.scheduled_departure - Duration::minutes(1);
        assert!(matches!(store.add_flight(bad).await, Err(StoreError::CheckViolation { .. })));
    }

    #[tokio::test]
    async fn test_uncommitted_transaction_leaves_no_trace() {
        let store = seeded().await;
        store.add_seat("SU9", "1A", FareConditions::Business).await.unwrap();
        store.add_segment("T1", 1, FareConditions::Business, 18500.0).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.insert_boarding_pass(&BoardingPass {
            ticket_no: "T1".to_string(),
            flight_id: 1,
            boarding_no: 1,
            seat_no: "1A".to_string(),
        })
        .await
        .unwrap();
        assert_eq!(tx.next_boarding_no(1).await.unwrap(), 2);
        drop(tx);

        assert!(store.boarding_passes(1).await.is_empty());
    }

    #[tokio::test]
    async fn test_find_boarding_pass_sees_staged_and_committed_rows() {
        let store = seeded().await;
        store.add_seat("SU9", "1A", FareConditions::Business).await.unwrap();
        store.add_seat("SU9", "1B", FareConditions::Business).await.unwrap();
        store.add_segment("T1", 1, FareConditions::Business, 18500.0).await.unwrap();
        store.add_segment("T2", 1, FareConditions::Business, 18500.0).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let first = BoardingPass {
            ticket_no: "T1".to_string(),
            flight_id: 1,
            boarding_no: 1,
            seat_no: "1A".to_string(),
        };
        tx.insert_boarding_pass(&first).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.find_boarding_pass("T1", 1).await.unwrap(), Some(first));
        assert_eq!(tx.find_boarding_pass("T1", 2).await.unwrap(), None);
        assert_eq!(tx.find_boarding_pass("T2", 1).await.unwrap(), None);

        let staged = BoardingPass {
            ticket_no: "T2".to_string(),
            flight_id: 1,
            boarding_no: 2,
            seat_no: "1B".to_string(),
        };
        tx.insert_boarding_pass(&staged).await.unwrap();
        assert_eq!(tx.find_boarding_pass("T2", 1).await.unwrap(), Some(staged));
    }

    #[tokio::test]
    async fn test_commit_rechecks_constraints() {
        let store = seeded().await;
        store.add_seat("SU9", "1A", FareConditions::Business).await.unwrap();
        store.add_segment("T1", 1, FareConditions::Business, 18500.0).await.unwrap();
        store.add_segment("T2", 1, FareConditions::Business, 18500.0).await.unwrap();

        let pass = |ticket: &str| BoardingPass {
            ticket_no: ticket.to_string(),
            flight_id: 1,
            boarding_no: 1,
            seat_no: "1A".to_string(),
        };

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();
        first.insert_boarding_pass(&pass("T1")).await.unwrap();
        second.insert_boarding_pass(&pass("T2")).await.unwrap();
        first.commit().await.unwrap();

        let err = second.commit().await.unwrap_err();
        assert_eq!(
            err,
            StoreError::UniqueViolation {
                constraint: BOARDING_PASSES_SEAT_KEY.to_string(),
                message: format!("duplicate key value violates unique constraint \"{}\"", BOARDING_PASSES_SEAT_KEY),
            }
        );
        assert_eq!(store.boarding_passes(1).await.len(), 1);
    }
}
