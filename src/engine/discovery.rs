//! Read-side queries over rides. Nothing here mutates or pushes.

use uuid::Uuid;

use crate::models::ride::{Ride, RideStatus};
use crate::store::RideStore;

/// Every claimable ride, oldest first. All drivers see the same list.
pub fn pending_rides(store: &dyn RideStore) -> Vec<Ride> {
    store.rides_matching(&|ride| ride.status == RideStatus::Pending)
}

/// Rides a driver has claimed and not yet finished, oldest first.
pub fn upcoming_rides(store: &dyn RideStore, driver_id: Uuid) -> Vec<Ride> {
    store.rides_matching(&|ride| {
        ride.driver_id == Some(driver_id)
            && matches!(ride.status, RideStatus::Accepted | RideStatus::InProgress)
    })
}

/// Completed rides driven by `driver_id`, newest first.
pub fn driver_history(store: &dyn RideStore, driver_id: Uuid) -> Vec<Ride> {
    newest_first(store.rides_matching(&|ride| {
        ride.driver_id == Some(driver_id) && ride.status == RideStatus::Completed
    }))
}

/// Completed rides requested by `rider_id`, newest first.
pub fn rider_history(store: &dyn RideStore, rider_id: Uuid) -> Vec<Ride> {
    newest_first(store.rides_matching(&|ride| {
        ride.rider_id == rider_id && ride.status == RideStatus::Completed
    }))
}

fn newest_first(mut rides: Vec<Ride>) -> Vec<Ride> {
    rides.reverse();
    rides
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::{driver_history, pending_rides, rider_history, upcoming_rides};
    use crate::models::ride::{Location, Ride, RideClass, RideStatus};
    use crate::store::{MemoryStore, RideStore};

    fn ride(rider_id: Uuid, minutes_ago: i64, status: RideStatus, driver_id: Option<Uuid>) -> Ride {
        let point = Location {
            latitude: 24.86,
            longitude: 67.0,
            name: "Saddar".to_string(),
        };
        let mut ride = Ride::new(rider_id, point.clone(), point, RideClass::Premium);
        ride.created_at = Utc::now() - Duration::minutes(minutes_ago);
        ride.status = status;
        ride.driver_id = driver_id;
        ride
    }

    #[test]
    fn pending_feed_is_oldest_first_and_excludes_claimed_rides() {
        let store = MemoryStore::new();
        let rider = Uuid::new_v4();
        let driver = Uuid::new_v4();

        let recent = ride(rider, 1, RideStatus::Pending, None);
        let old = ride(rider, 30, RideStatus::Pending, None);
        let claimed = ride(rider, 60, RideStatus::Accepted, Some(driver));
        let declined = ride(rider, 90, RideStatus::Declined, None);
        for r in [&recent, &old, &claimed, &declined] {
            store.insert_ride(r.clone());
        }

        let ids: Vec<Uuid> = pending_rides(&store).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![old.id, recent.id]);
    }

    #[test]
    fn pending_feed_is_empty_without_rides() {
        assert!(pending_rides(&MemoryStore::new()).is_empty());
    }

    #[test]
    fn upcoming_rides_belong_to_the_driver() {
        let store = MemoryStore::new();
        let rider = Uuid::new_v4();
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();

        let started = ride(rider, 20, RideStatus::InProgress, Some(me));
        let accepted = ride(rider, 10, RideStatus::Accepted, Some(me));
        let theirs = ride(rider, 15, RideStatus::Accepted, Some(other));
        let done = ride(rider, 40, RideStatus::Completed, Some(me));
        for r in [&started, &accepted, &theirs, &done] {
            store.insert_ride(r.clone());
        }

        let ids: Vec<Uuid> = upcoming_rides(&store, me).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![started.id, accepted.id]);
    }

    #[test]
    fn histories_are_newest_first() {
        let store = MemoryStore::new();
        let rider = Uuid::new_v4();
        let driver = Uuid::new_v4();

        let first = ride(rider, 120, RideStatus::Completed, Some(driver));
        let second = ride(rider, 60, RideStatus::Completed, Some(driver));
        let unfinished = ride(rider, 5, RideStatus::InProgress, Some(driver));
        let someone_else = ride(Uuid::new_v4(), 30, RideStatus::Completed, Some(Uuid::new_v4()));
        for r in [&first, &second, &unfinished, &someone_else] {
            store.insert_ride(r.clone());
        }

        let by_driver: Vec<Uuid> = driver_history(&store, driver).iter().map(|r| r.id).collect();
        let by_rider: Vec<Uuid> = rider_history(&store, rider).iter().map(|r| r.id).collect();

        assert_eq!(by_driver, vec![second.id, first.id]);
        assert_eq!(by_rider, vec![second.id, first.id]);
    }
}
