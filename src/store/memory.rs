use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::driver::Driver;
use crate::models::ride::{Ride, RideStatus};
use crate::store::{RideStore, StoreError};

struct StoredRide {
    // Insertion order; breaks ties between equal creation timestamps.
    seq: u64,
    ride: Ride,
}

/// In-process store backed by sharded concurrent maps.
#[derive(Default)]
pub struct MemoryStore {
    rides: DashMap<Uuid, StoredRide>,
    next_seq: AtomicU64,
    drivers: DashMap<Uuid, Driver>,
    drivers_by_user: DashMap<Uuid, Uuid>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RideStore for MemoryStore {
    fn insert_ride(&self, ride: Ride) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.rides.insert(ride.id, StoredRide { seq, ride });
    }

    fn ride(&self, id: Uuid) -> Option<Ride> {
        self.rides.get(&id).map(|entry| entry.value().ride.clone())
    }

    fn transition(
        &self,
        id: Uuid,
        from: RideStatus,
        to: RideStatus,
        update: &mut dyn FnMut(&mut Ride),
    ) -> Result<Ride, StoreError> {
        if !from.can_transition_to(to) {
            return Err(StoreError::IllegalTransition { from, to });
        }

        // Shard write lock held until `stored` drops.
        let mut stored = self.rides.get_mut(&id).ok_or(StoreError::RideNotFound(id))?;
        if stored.ride.status != from {
            return Err(StoreError::StatusMismatch {
                id,
                expected: from,
                actual: stored.ride.status,
            });
        }

        let mut next = stored.ride.clone();
        update(&mut next);
        next.status = to;
        stored.ride = next;

        Ok(stored.ride.clone())
    }

    fn set_fare_if_absent(&self, id: Uuid, fare: u64) -> Result<u64, StoreError> {
        let mut stored = self.rides.get_mut(&id).ok_or(StoreError::RideNotFound(id))?;
        Ok(*stored.ride.fare.get_or_insert(fare))
    }

    fn rides_matching(&self, filter: &dyn Fn(&Ride) -> bool) -> Vec<Ride> {
        let mut rides: Vec<(u64, Ride)> = self
            .rides
            .iter()
            .filter_map(|entry| {
                let stored = entry.value();
                if filter(&stored.ride) {
                    Some((stored.seq, stored.ride.clone()))
                } else {
                    None
                }
            })
            .collect();

        rides.sort_by(|(a_seq, a), (b_seq, b)| {
            a.created_at.cmp(&b.created_at).then(a_seq.cmp(b_seq))
        });
        rides.into_iter().map(|(_, ride)| ride).collect()
    }

    fn ride_count(&self) -> usize {
        self.rides.len()
    }

    fn insert_driver(&self, driver: Driver) -> Result<(), StoreError> {
        match self.drivers_by_user.entry(driver.user_id) {
            Entry::Occupied(_) => Err(StoreError::DuplicateDriver(driver.user_id)),
            Entry::Vacant(slot) => {
                slot.insert(driver.id);
                self.drivers.insert(driver.id, driver);
                Ok(())
            }
        }
    }

    fn driver(&self, id: Uuid) -> Option<Driver> {
        self.drivers.get(&id).map(|entry| entry.value().clone())
    }

    fn driver_by_user(&self, user_id: Uuid) -> Option<Driver> {
        let driver_id = *self.drivers_by_user.get(&user_id)?;
        self.driver(driver_id)
    }

    fn update_driver(
        &self,
        id: Uuid,
        update: &mut dyn FnMut(&mut Driver),
    ) -> Result<Driver, StoreError> {
        let mut driver = self
            .drivers
            .get_mut(&id)
            .ok_or(StoreError::DriverNotFound(id))?;
        update(&mut *driver);
        Ok(driver.clone())
    }

    fn driver_count(&self) -> usize {
        self.drivers.len()
    }
}
