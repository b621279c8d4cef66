use aerodesk_shared::{Airport, AirportSummary, BoardingPass, FareConditions, InboundRoute, OutboundRoute};
use async_trait::async_trait;

/// Failures reported by a persistence backend. Constraint violations keep the
/// constraint name so callers can tell which rule tripped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{message}")]
    UniqueViolation { constraint: String, message: String },
    #[error("{message}")]
    ForeignKeyViolation { constraint: String, message: String },
    #[error("{message}")]
    CheckViolation { constraint: String, message: String },
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// What the allocator needs to know about a bookable segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentInfo {
    pub ticket_no: String,
    pub flight_id: i32,
    pub aircraft_code: String,
    pub fare_conditions: FareConditions,
}

/// Source of check-in transactions.
#[async_trait]
pub trait CheckInStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn CheckInTransaction>, StoreError>;
}

/// One unit of work against the store. Dropping it without `commit` discards
/// everything done through it.
#[async_trait]
pub trait CheckInTransaction: Send {
    /// Segment joined with its flight's aircraft, or `None` when the
    /// (ticket, flight) pair is not a ticket segment.
    async fn find_segment(
        &mut self,
        ticket_no: &str,
        flight_id: i32,
    ) -> Result<Option<SegmentInfo>, StoreError>;

    async fn find_boarding_pass(
        &mut self,
        ticket_no: &str,
        flight_id: i32,
    ) -> Result<Option<BoardingPass>, StoreError>;

    /// Lowest seat number (byte order) of the aircraft model that has no
    /// boarding pass on this flight.
    async fn first_free_seat(
        &mut self,
        flight_id: i32,
        aircraft_code: &str,
    ) -> Result<Option<String>, StoreError>;

    /// One past the highest boarding number issued for the flight, 1 if none.
    async fn next_boarding_no(&mut self, flight_id: i32) -> Result<i32, StoreError>;

    async fn insert_boarding_pass(&mut self, pass: &BoardingPass) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Read-only lookups behind the query endpoints.
#[async_trait]
pub trait QueryRepository: Send + Sync {
    async fn list_cities(&self) -> Result<Vec<String>, StoreError>;

    async fn list_airports(&self) -> Result<Vec<Airport>, StoreError>;

    /// `city_pattern` follows SQL `LIKE` rules.
    async fn airports_in_city(&self, city_pattern: &str) -> Result<Vec<AirportSummary>, StoreError>;

    async fn outbound_routes(&self, airport_code: &str) -> Result<Vec<OutboundRoute>, StoreError>;

    async fn inbound_routes(&self, airport_code: &str) -> Result<Vec<InboundRoute>, StoreError>;
}
