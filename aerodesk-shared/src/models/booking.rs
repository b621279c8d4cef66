use serde::{Deserialize, Serialize};

use super::fleet::FareConditions;

pub const BOARDING_PASSES_PKEY: &str = "boarding_passes_pkey";
pub const BOARDING_PASSES_SEAT_KEY: &str = "boarding_passes_flight_id_seat_no_key";
pub const BOARDING_PASSES_BOARDING_NO_KEY: &str = "boarding_passes_flight_id_boarding_no_key";
pub const BOARDING_PASSES_SEGMENT_FKEY: &str = "boarding_passes_ticket_no_fkey";

/// A bookable segment: one ticket on one flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketFlight {
    pub ticket_no: String,
    pub flight_id: i32,
    pub fare_conditions: FareConditions,
    pub amount: f64,
}

/// Issued at check-in. `seat_no` and `boarding_no` are each unique per flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardingPass {
    pub ticket_no: String,
    pub flight_id: i32,
    pub boarding_no: i32,
    pub seat_no: String,
}
