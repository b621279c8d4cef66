use aerodesk_core::CheckInRequest;
use aerodesk_shared::BoardingPass;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::{error::AppError, state::AppState};

// Fields are optional so a missing one is reported as a 400 by us rather
// than as a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct CheckInBody {
    pub ticket_no: Option<String>,
    pub flight_id: Option<i32>,
}

impl TryFrom<CheckInBody> for CheckInRequest {
    type Error = AppError;

    fn try_from(body: CheckInBody) -> Result<Self, Self::Error> {
        let ticket_no = body
            .ticket_no
            .ok_or_else(|| AppError::ValidationError("ticket_no is required".to_string()))?;
        let flight_id = body
            .flight_id
            .ok_or_else(|| AppError::ValidationError("flight_id is required".to_string()))?;
        Ok(CheckInRequest::new(ticket_no, flight_id))
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/check-in", post(check_in))
}

/// POST /check-in
/// A 409 may be retried by the caller; the seat and boarding number are
/// recomputed on every attempt.
async fn check_in(
    State(state): State<AppState>,
    payload: Result<Json<CheckInBody>, JsonRejection>,
) -> Result<(StatusCode, Json<BoardingPass>), AppError> {
    let Json(body) = payload?;
    let request = CheckInRequest::try_from(body)?;

    let pass = state.check_in.check_in(&request).await?;
    Ok((StatusCode::CREATED, Json(pass)))
}
