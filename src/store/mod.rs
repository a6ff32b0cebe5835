//! Durable record storage for rides and drivers.
//!
//! Every mutation goes through a conditional update that checks and writes
//! under the record's lock, so two callers can never both observe the same
//! precondition and both win.

pub mod memory;

use thiserror::Error;
use uuid::Uuid;

use crate::models::driver::Driver;
use crate::models::ride::{Ride, RideStatus};

pub use memory::MemoryStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("ride {0} not found")]
    RideNotFound(Uuid),

    #[error("driver {0} not found")]
    DriverNotFound(Uuid),

    #[error("ride {id} is {actual}, expected {expected}")]
    StatusMismatch {
        id: Uuid,
        expected: RideStatus,
        actual: RideStatus,
    },

    #[error("{from} -> {to} is not a ride transition")]
    IllegalTransition { from: RideStatus, to: RideStatus },

    #[error("user {0} already has a driver profile")]
    DuplicateDriver(Uuid),
}

pub trait RideStore: Send + Sync {
    fn insert_ride(&self, ride: Ride);

    fn ride(&self, id: Uuid) -> Option<Ride>;

    /// Atomically moves a ride from `from` to `to`.
    ///
    /// The status check, `update` and the status write happen under one lock.
    /// On any error the stored ride is untouched.
    fn transition(
        &self,
        id: Uuid,
        from: RideStatus,
        to: RideStatus,
        update: &mut dyn FnMut(&mut Ride),
    ) -> Result<Ride, StoreError>;

    /// Stores `fare` unless one is already set; returns the fare now stored.
    fn set_fare_if_absent(&self, id: Uuid, fare: u64) -> Result<u64, StoreError>;

    /// Rides accepted by `filter`, oldest first.
    fn rides_matching(&self, filter: &dyn Fn(&Ride) -> bool) -> Vec<Ride>;

    fn ride_count(&self) -> usize;

    /// Inserts a new driver. Fails if the backing user already has one.
    fn insert_driver(&self, driver: Driver) -> Result<(), StoreError>;

    fn driver(&self, id: Uuid) -> Option<Driver>;

    fn driver_by_user(&self, user_id: Uuid) -> Option<Driver>;

    fn update_driver(
        &self,
        id: Uuid,
        update: &mut dyn FnMut(&mut Driver),
    ) -> Result<Driver, StoreError>;

    fn driver_count(&self) -> usize;
}
