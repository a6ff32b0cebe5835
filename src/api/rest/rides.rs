use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::engine::discovery;
use crate::engine::lifecycle::{self, CreateRideRequest};
use crate::error::AppError;
use crate::models::ride::Ride;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rides", post(create_ride))
        .route("/rides/pending", get(list_pending_rides))
        .route("/rides/:id", get(get_ride))
        .route("/rides/:id/accept", post(accept_ride))
        .route("/rides/:id/decline", post(decline_ride))
        .route("/rides/:id/start", post(start_ride))
        .route("/rides/:id/complete", post(complete_ride))
        .route("/rides/:id/fare", get(get_fare))
        .route("/riders/:id/ride-history", get(rider_history))
}

#[derive(Deserialize)]
pub struct DriverActionRequest {
    pub driver_id: Uuid,
}

#[derive(Deserialize)]
pub struct PendingRidesQuery {
    pub driver_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct FareResponse {
    pub ride_id: Uuid,
    pub fare: u64,
}

async fn create_ride(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateRideRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Ride>), AppError> {
    let Json(payload) = payload?;
    let ride = lifecycle::create_ride(&state, payload)?;
    Ok((StatusCode::CREATED, Json(ride)))
}

async fn list_pending_rides(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PendingRidesQuery>,
) -> Json<Vec<Ride>> {
    let rides = discovery::pending_rides(state.store.as_ref());
    debug!(driver_id = ?query.driver_id, count = rides.len(), "pending rides listed");
    Json(rides)
}

async fn get_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ride>, AppError> {
    Ok(Json(lifecycle::get_ride(&state, id)?))
}

async fn accept_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<DriverActionRequest>, JsonRejection>,
) -> Result<Json<Ride>, AppError> {
    let Json(payload) = payload?;
    Ok(Json(lifecycle::accept_ride(&state, id, payload.driver_id)?))
}

async fn decline_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<DriverActionRequest>, JsonRejection>,
) -> Result<Json<Ride>, AppError> {
    let Json(payload) = payload?;
    Ok(Json(lifecycle::decline_ride(&state, id, payload.driver_id)?))
}

async fn start_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ride>, AppError> {
    Ok(Json(lifecycle::start_ride(&state, id)?))
}

async fn complete_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ride>, AppError> {
    Ok(Json(lifecycle::complete_ride(&state, id)?))
}

async fn get_fare(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<FareResponse>, AppError> {
    let fare = lifecycle::get_fare(&state, id)?;
    Ok(Json(FareResponse { ride_id: id, fare }))
}

async fn rider_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Json<Vec<Ride>> {
    Json(discovery::rider_history(state.store.as_ref(), id))
}
