pub mod models;

pub use models::airport::{Airport, AirportSummary, InboundRoute, OutboundRoute};
pub use models::booking::{BoardingPass, TicketFlight};
pub use models::fleet::{Aircraft, FareConditions, Seat};
pub use models::flight::{Flight, FlightStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Unknown fare conditions: {0}")]
    UnknownFareConditions(String),
    #[error("Unknown flight status: {0}")]
    UnknownFlightStatus(String),
    #[error("Invalid schedule for flight {flight_id}: {reason}")]
    InvalidSchedule { flight_id: i32, reason: String },
}
