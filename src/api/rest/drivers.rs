use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::Json;
use axum::Router;
use serde::Serialize;
use uuid::Uuid;

use crate::engine::discovery;
use crate::engine::drivers::{self, DriverProfileRequest};
use crate::error::AppError;
use crate::models::driver::{Driver, DriverView};
use crate::models::ride::Ride;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drivers", post(register_driver))
        .route("/drivers/config", put(configure_driver))
        .route("/drivers/:id", get(get_driver))
        .route("/drivers/:id/earnings", get(get_earnings))
        .route("/drivers/:id/upcoming-rides", get(upcoming_rides))
        .route("/drivers/:id/ride-history", get(ride_history))
}

#[derive(Serialize)]
pub struct EarningsResponse {
    pub driver_id: Uuid,
    pub earnings: u64,
}

async fn register_driver(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DriverProfileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Driver>), AppError> {
    let Json(payload) = payload?;
    let driver = drivers::register_driver(&state, payload)?;
    Ok((StatusCode::CREATED, Json(driver)))
}

async fn configure_driver(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DriverProfileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Driver>), AppError> {
    let Json(payload) = payload?;
    let (driver, created) = drivers::configure_driver(&state, payload)?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(driver)))
}

async fn get_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DriverView>, AppError> {
    Ok(Json(drivers::get_driver(&state, id)?))
}

async fn get_earnings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<EarningsResponse>, AppError> {
    let earnings = drivers::driver_earnings(&state, id)?;
    Ok(Json(EarningsResponse {
        driver_id: id,
        earnings,
    }))
}

async fn upcoming_rides(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Ride>>, AppError> {
    drivers::get_driver(&state, id)?;
    Ok(Json(discovery::upcoming_rides(state.store.as_ref(), id)))
}

async fn ride_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Ride>>, AppError> {
    drivers::get_driver(&state, id)?;
    Ok(Json(discovery::driver_history(state.store.as_ref(), id)))
}
