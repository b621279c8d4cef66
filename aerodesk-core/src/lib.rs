pub mod checkin;
pub mod memory;
pub mod query;
pub mod repository;

pub use checkin::{CheckInAllocator, CheckInRequest};
pub use memory::MemoryStore;
pub use query::QueryService;
pub use repository::{CheckInStore, CheckInTransaction, QueryRepository, SegmentInfo, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Ticket {ticket_no} is already checked in for flight {flight_id} (boarding_passes_pkey)")]
    AlreadyCheckedIn { ticket_no: String, flight_id: i32 },
    #[error("Check-in conflict on {constraint}: {message}")]
    Conflict { constraint: String, message: String },
    #[error("No free seats left on flight {flight_id}")]
    SeatsExhausted { flight_id: i32 },
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl CoreError {
    /// Only a commit-time conflict is worth retrying from scratch; every other
    /// failure gives the same answer on a second attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Conflict { .. })
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::InternalError(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
