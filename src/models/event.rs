use serde::{Deserialize, Serialize};

use crate::models::ride::Ride;

/// Server-to-client push sent over a registered presence channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RideEvent {
    RideAccepted { ride: Ride },
    RideDeclined { ride: Ride },
    RideStarted { ride: Ride },
    RideCompleted { ride: Ride },
}

impl RideEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            RideEvent::RideAccepted { .. } => "ride_accepted",
            RideEvent::RideDeclined { .. } => "ride_declined",
            RideEvent::RideStarted { .. } => "ride_started",
            RideEvent::RideCompleted { .. } => "ride_completed",
        }
    }
}
