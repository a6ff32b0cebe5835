use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::driver::{Driver, DriverView, Vehicle};
use crate::state::AppState;
use crate::store::StoreError;

#[derive(Debug, Clone, Deserialize)]
pub struct DriverProfileRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub vehicle: Vehicle,
    #[serde(default)]
    pub is_available: bool,
}

pub fn register_driver(state: &AppState, request: DriverProfileRequest) -> Result<Driver, AppError> {
    let driver = Driver::new(request.user_id, request.vehicle, request.is_available);
    state.store.insert_driver(driver.clone())?;

    info!(driver_id = %driver.id, user_id = %driver.user_id, "driver registered");
    Ok(driver)
}

/// Updates the user's driver profile, creating it on first use.
///
/// Returns the profile and whether it was created.
pub fn configure_driver(
    state: &AppState,
    request: DriverProfileRequest,
) -> Result<(Driver, bool), AppError> {
    loop {
        if let Some(existing) = state.store.driver_by_user(request.user_id) {
            let driver = state.store.update_driver(existing.id, &mut |driver| {
                driver.vehicle = request.vehicle.clone();
                driver.is_available = request.is_available;
                driver.updated_at = Utc::now();
            })?;
            info!(driver_id = %driver.id, is_available = driver.is_available, "driver configured");
            return Ok((driver, false));
        }

        match register_driver(state, request.clone()) {
            Ok(driver) => return Ok((driver, true)),
            // Lost a race with a concurrent first configuration; update theirs.
            Err(AppError::Conflict(_)) => continue,
            Err(err) => return Err(err),
        }
    }
}

pub fn get_driver(state: &AppState, driver_id: Uuid) -> Result<DriverView, AppError> {
    let driver = state
        .store
        .driver(driver_id)
        .ok_or(StoreError::DriverNotFound(driver_id))?;

    Ok(DriverView {
        connected: state.presence.is_connected(driver.id),
        driver,
    })
}

pub fn driver_earnings(state: &AppState, driver_id: Uuid) -> Result<u64, AppError> {
    Ok(get_driver(state, driver_id)?.driver.total_earnings)
}
