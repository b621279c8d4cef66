use std::sync::Arc;

use aerodesk_shared::models::booking::BOARDING_PASSES_PKEY;
use aerodesk_shared::BoardingPass;
use tracing::{debug, info, warn};

use crate::repository::{CheckInStore, StoreError};
use crate::{CoreError, CoreResult};

const TICKET_NO_MAX_LEN: usize = 13;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInRequest {
    pub ticket_no: String,
    pub flight_id: i32,
}

impl CheckInRequest {
    pub fn new(ticket_no: impl Into<String>, flight_id: i32) -> Self {
        Self {
            ticket_no: ticket_no.into(),
            flight_id,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.ticket_no.trim().is_empty() {
            return Err(CoreError::ValidationError("ticket_no must not be empty".to_string()));
        }
        if self.ticket_no.chars().count() > TICKET_NO_MAX_LEN {
            return Err(CoreError::ValidationError(format!(
                "ticket_no must be at most {} characters",
                TICKET_NO_MAX_LEN
            )));
        }
        if self.flight_id <= 0 {
            return Err(CoreError::ValidationError("flight_id must be positive".to_string()));
        }
        Ok(())
    }
}

/// Issues boarding passes. Seat and boarding number are picked from what the
/// store has committed so far; the store's unique constraints decide who wins
/// when two check-ins race for the same flight.
pub struct CheckInAllocator {
    store: Arc<dyn CheckInStore>,
}

impl CheckInAllocator {
    pub fn new(store: Arc<dyn CheckInStore>) -> Self {
        Self { store }
    }

    /// Check a segment in. A `Conflict` error means another check-in committed
    /// first and the whole call can be repeated; nothing is retried here.
    pub async fn check_in(&self, request: &CheckInRequest) -> CoreResult<BoardingPass> {
        request.validate()?;
        let ticket_no = request.ticket_no.as_str();
        let flight_id = request.flight_id;

        let mut tx = self.store.begin().await?;

        // 1. Segment must exist and not be checked in yet
        let segment = tx
            .find_segment(ticket_no, flight_id)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound(format!("ticket {} has no segment on flight {}", ticket_no, flight_id))
            })?;

        if tx.find_boarding_pass(ticket_no, flight_id).await?.is_some() {
            return Err(CoreError::AlreadyCheckedIn {
                ticket_no: ticket_no.to_string(),
                flight_id,
            });
        }

        // 2. Seat from the aircraft model's map, scoped to this flight
        let seat_no = tx
            .first_free_seat(flight_id, &segment.aircraft_code)
            .await?
            .ok_or(CoreError::SeatsExhausted { flight_id })?;

        // 3. Boarding number
        let boarding_no = tx.next_boarding_no(flight_id).await?;
        debug!(
            "Candidate seat {} / boarding no {} for ticket {} on flight {}",
            seat_no, boarding_no, ticket_no, flight_id
        );

        let pass = BoardingPass {
            ticket_no: ticket_no.to_string(),
            flight_id,
            boarding_no,
            seat_no,
        };

        // 4. Insert and commit; constraint violations become typed errors
        if let Err(err) = tx.insert_boarding_pass(&pass).await {
            return Err(self.translate(request, err));
        }
        if let Err(err) = tx.commit().await {
            return Err(self.translate(request, err));
        }

        info!(
            "Checked in ticket {} on flight {}: seat {}, boarding no {}",
            pass.ticket_no, pass.flight_id, pass.seat_no, pass.boarding_no
        );
        Ok(pass)
    }

    fn translate(&self, request: &CheckInRequest, err: StoreError) -> CoreError {
        let translated = translate_store_error(request, err);
        match &translated {
            CoreError::Conflict { constraint, .. } => warn!(
                "Check-in conflict for ticket {} on flight {} ({})",
                request.ticket_no, request.flight_id, constraint
            ),
            CoreError::AlreadyCheckedIn { .. } => warn!(
                "Concurrent duplicate check-in for ticket {} on flight {}",
                request.ticket_no, request.flight_id
            ),
            _ => {}
        }
        translated
    }
}

fn translate_store_error(request: &CheckInRequest, err: StoreError) -> CoreError {
    match err {
        StoreError::UniqueViolation { constraint, .. } if constraint == BOARDING_PASSES_PKEY => {
            CoreError::AlreadyCheckedIn {
                ticket_no: request.ticket_no.clone(),
                flight_id: request.flight_id,
            }
        }
        StoreError::UniqueViolation { constraint, message } => CoreError::Conflict { constraint, message },
        StoreError::ForeignKeyViolation { message, .. } => CoreError::NotFound(message),
        other => CoreError::InternalError(other.to_string()),
    }
}
