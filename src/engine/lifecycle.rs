use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::engine::fare::fare_for_ride;
use crate::error::AppError;
use crate::geo::validate_location;
use crate::models::event::RideEvent;
use crate::models::ride::{Location, Ride, RideClass, RideStatus};
use crate::state::AppState;
use crate::store::StoreError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRideRequest {
    pub rider_id: Option<Uuid>,
    pub pickup: Option<Location>,
    pub dropoff: Option<Location>,
    #[serde(alias = "ride_type")]
    pub ride_class: Option<RideClass>,
}

pub fn create_ride(state: &AppState, request: CreateRideRequest) -> Result<Ride, AppError> {
    let rider_id = request
        .rider_id
        .ok_or_else(|| AppError::Validation("rider_id is required".to_string()))?;
    let pickup = request
        .pickup
        .ok_or_else(|| AppError::Validation("pickup is required".to_string()))?;
    let dropoff = request
        .dropoff
        .ok_or_else(|| AppError::Validation("dropoff is required".to_string()))?;
    let ride_class = request
        .ride_class
        .ok_or_else(|| AppError::Validation("ride_class is required".to_string()))?;

    validate_location(&pickup).map_err(|msg| AppError::Validation(format!("pickup: {msg}")))?;
    validate_location(&dropoff).map_err(|msg| AppError::Validation(format!("dropoff: {msg}")))?;

    let ride = Ride::new(rider_id, pickup, dropoff, ride_class);
    state.store.insert_ride(ride.clone());

    record_transition(state, RideStatus::Pending);
    state.metrics.pending_rides.inc();
    info!(ride_id = %ride.id, rider_id = %rider_id, ride_class = ?ride_class, "ride requested");

    Ok(ride)
}

pub fn get_ride(state: &AppState, ride_id: Uuid) -> Result<Ride, AppError> {
    state
        .store
        .ride(ride_id)
        .ok_or_else(|| AppError::NotFound(format!("ride {ride_id} not found")))
}

/// Claims a pending ride for `driver_id`.
///
/// Only one of any number of concurrent callers succeeds; the rest get
/// `Conflict` and leave the ride untouched.
pub fn accept_ride(state: &AppState, ride_id: Uuid, driver_id: Uuid) -> Result<Ride, AppError> {
    ensure_driver(state, driver_id)?;

    let ride = state
        .store
        .transition(ride_id, RideStatus::Pending, RideStatus::Accepted, &mut |ride| {
            ride.driver_id = Some(driver_id)
        })
        .map_err(|err| match err {
            StoreError::StatusMismatch { actual, .. } => {
                state.metrics.accept_conflicts_total.inc();
                warn!(%ride_id, %driver_id, status = %actual, "accept lost: ride no longer pending");
                AppError::Conflict(format!("ride {ride_id} is no longer pending ({actual})"))
            }
            other => AppError::from(other),
        })?;

    record_transition(state, RideStatus::Accepted);
    state.metrics.pending_rides.dec();
    info!(%ride_id, %driver_id, "ride accepted");

    state
        .presence
        .notify(ride.rider_id, RideEvent::RideAccepted { ride: ride.clone() });

    Ok(ride)
}

/// Takes a pending ride out of circulation for every driver.
pub fn decline_ride(state: &AppState, ride_id: Uuid, driver_id: Uuid) -> Result<Ride, AppError> {
    ensure_driver(state, driver_id)?;

    let ride = state
        .store
        .transition(ride_id, RideStatus::Pending, RideStatus::Declined, &mut |_| {})?;

    record_transition(state, RideStatus::Declined);
    state.metrics.pending_rides.dec();
    info!(%ride_id, %driver_id, "ride declined");

    state
        .presence
        .notify(ride.rider_id, RideEvent::RideDeclined { ride: ride.clone() });

    Ok(ride)
}

pub fn start_ride(state: &AppState, ride_id: Uuid) -> Result<Ride, AppError> {
    let ride = state
        .store
        .transition(ride_id, RideStatus::Accepted, RideStatus::InProgress, &mut |_| {})?;

    record_transition(state, RideStatus::InProgress);
    info!(%ride_id, driver_id = ?ride.driver_id, "ride started");

    state
        .presence
        .notify(ride.rider_id, RideEvent::RideStarted { ride: ride.clone() });

    Ok(ride)
}

/// Finishes an in-progress ride and settles it.
///
/// The fare is fixed on first computation and the driver is credited only by
/// the caller whose transition to `completed` succeeds, so a repeated call
/// fails with `InvalidTransition` and credits nothing.
pub fn complete_ride(state: &AppState, ride_id: Uuid) -> Result<Ride, AppError> {
    let current = get_ride(state, ride_id)?;
    if current.status != RideStatus::InProgress {
        return Err(AppError::InvalidTransition(format!(
            "ride {ride_id} is {}, expected {}",
            current.status,
            RideStatus::InProgress
        )));
    }

    let driver_id = current.driver_id.ok_or_else(|| {
        AppError::Internal(format!("ride {ride_id} is in progress without a driver"))
    })?;
    ensure_driver(state, driver_id)?;

    let quoted = current.fare.unwrap_or_else(|| fare_for_ride(&current));
    let ride = state
        .store
        .transition(ride_id, RideStatus::InProgress, RideStatus::Completed, &mut |ride| {
            ride.fare.get_or_insert(quoted);
        })?;
    let fare = ride.fare.unwrap_or(quoted);

    let driver = state
        .store
        .update_driver(driver_id, &mut |driver| {
            driver.total_earnings = driver.total_earnings.saturating_add(fare);
            driver.updated_at = Utc::now();
        })
        .map_err(|err| {
            error!(%ride_id, %driver_id, error = %err, "ride completed but earnings not credited");
            AppError::Internal(format!("failed to credit driver {driver_id}: {err}"))
        })?;

    record_transition(state, RideStatus::Completed);
    state.metrics.settled_fare.observe(fare as f64);
    info!(
        %ride_id,
        %driver_id,
        fare,
        total_earnings = driver.total_earnings,
        "ride completed"
    );

    state
        .presence
        .notify(ride.rider_id, RideEvent::RideCompleted { ride: ride.clone() });
    state
        .presence
        .notify(driver_id, RideEvent::RideCompleted { ride: ride.clone() });

    Ok(ride)
}

/// Returns the ride's fare, fixing it on first call if not yet set.
pub fn get_fare(state: &AppState, ride_id: Uuid) -> Result<u64, AppError> {
    let ride = get_ride(state, ride_id)?;
    if let Some(fare) = ride.fare {
        return Ok(fare);
    }

    let fare = state.store.set_fare_if_absent(ride_id, fare_for_ride(&ride))?;
    info!(%ride_id, fare, "fare quoted");
    Ok(fare)
}

fn ensure_driver(state: &AppState, driver_id: Uuid) -> Result<(), AppError> {
    match state.store.driver(driver_id) {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("driver {driver_id} not found"))),
    }
}

fn record_transition(state: &AppState, status: RideStatus) {
    state
        .metrics
        .ride_transitions_total
        .with_label_values(&[status.as_str()])
        .inc();
}
