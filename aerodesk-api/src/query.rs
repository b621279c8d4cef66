use aerodesk_shared::{Airport, AirportSummary, InboundRoute, OutboundRoute};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/cities", get(list_cities))
        .route("/airports", get(list_airports))
        .route("/airports/{city}", get(airports_in_city))
        .route("/outbound/{airport}", get(outbound_routes))
        .route("/inbound/{airport}", get(inbound_routes))
}

async fn index() -> Json<Value> {
    Json(json!({ "hello": "world" }))
}

/// GET /cities
async fn list_cities(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.queries.cities().await?))
}

/// GET /airports
async fn list_airports(State(state): State<AppState>) -> Result<Json<Vec<Airport>>, AppError> {
    Ok(Json(state.queries.airports().await?))
}

/// GET /airports/{city}
async fn airports_in_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<Vec<AirportSummary>>, AppError> {
    Ok(Json(state.queries.airports_in_city(&city).await?))
}

/// GET /outbound/{airport}
async fn outbound_routes(
    State(state): State<AppState>,
    Path(airport): Path<String>,
) -> Result<Json<Vec<OutboundRoute>>, AppError> {
    Ok(Json(state.queries.outbound_routes(&airport).await?))
}

/// GET /inbound/{airport}
async fn inbound_routes(
    State(state): State<AppState>,
    Path(airport): Path<String>,
) -> Result<Json<Vec<InboundRoute>>, AppError> {
    Ok(Json(state.queries.inbound_routes(&airport).await?))
}
