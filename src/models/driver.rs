use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Vehicle {
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub license_plate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Self-reported; dispatch does not consult it.
    pub is_available: bool,
    pub vehicle: Vehicle,
    pub total_earnings: u64,
    pub updated_at: DateTime<Utc>,
}

impl Driver {
    pub fn new(user_id: Uuid, vehicle: Vehicle, is_available: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            is_available,
            vehicle,
            total_earnings: 0,
            updated_at: Utc::now(),
        }
    }
}

/// Driver record as returned to clients, with presence folded in.
#[derive(Debug, Clone, Serialize)]
pub struct DriverView {
    #[serde(flatten)]
    pub driver: Driver,
    pub connected: bool,
}
