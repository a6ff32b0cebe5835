use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named geographic point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RideClass {
    #[serde(alias = "RideZap")]
    Standard,
    #[serde(alias = "RideZapX")]
    Premium,
}

impl RideClass {
    pub fn multiplier(self) -> f64 {
        match self {
            RideClass::Standard => 1.0,
            RideClass::Premium => 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Pending,
    Accepted,
    Declined,
    InProgress,
    Completed,
}

impl RideStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RideStatus::Pending => "pending",
            RideStatus::Accepted => "accepted",
            RideStatus::Declined => "declined",
            RideStatus::InProgress => "in_progress",
            RideStatus::Completed => "completed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Declined)
    }

    pub fn can_transition_to(self, next: RideStatus) -> bool {
        matches!(
            (self, next),
            (RideStatus::Pending, RideStatus::Accepted)
                | (RideStatus::Pending, RideStatus::Declined)
                | (RideStatus::Accepted, RideStatus::InProgress)
                | (RideStatus::InProgress, RideStatus::Completed)
        )
    }
}

impl std::fmt::Display for RideStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    pub rider_id: Uuid,
    pub pickup: Location,
    pub dropoff: Location,
    pub ride_class: RideClass,
    pub status: RideStatus,
    pub driver_id: Option<Uuid>,
    pub fare: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl Ride {
    pub fn new(rider_id: Uuid, pickup: Location, dropoff: Location, ride_class: RideClass) -> Self {
        Self {
            id: Uuid::new_v4(),
            rider_id,
            pickup,
            dropoff,
            ride_class,
            status: RideStatus::Pending,
            driver_id: None,
            fare: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RideClass, RideStatus};

    const ALL: [RideStatus; 5] = [
        RideStatus::Pending,
        RideStatus::Accepted,
        RideStatus::Declined,
        RideStatus::InProgress,
        RideStatus::Completed,
    ];

    #[test]
    fn in_progress_is_only_reachable_from_accepted() {
        for from in ALL {
            assert_eq!(
                from.can_transition_to(RideStatus::InProgress),
                from == RideStatus::Accepted,
                "{from} -> in_progress"
            );
        }
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for from in ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn nothing_transitions_back_to_pending() {
        for from in ALL {
            assert!(!from.can_transition_to(RideStatus::Pending));
        }
    }

    #[test]
    fn ride_class_accepts_product_names() {
        let standard: RideClass = serde_json::from_str("\"RideZap\"").unwrap();
        let premium: RideClass = serde_json::from_str("\"RideZapX\"").unwrap();
        assert_eq!(standard, RideClass::Standard);
        assert_eq!(premium, RideClass::Premium);
        assert_eq!(serde_json::to_string(&premium).unwrap(), "\"premium\"");
    }
}
