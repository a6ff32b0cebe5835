use crate::geo::haversine_km;
use crate::models::ride::{Location, Ride, RideClass};

pub const BASE_FARE: f64 = 50.0;
pub const PER_KM_RATE: f64 = 30.0;
pub const MINIMUM_FARE: u64 = 100;

/// Price of a trip in whole currency units.
///
/// `BASE_FARE + distance_km * PER_KM_RATE * class multiplier`, rounded to the
/// nearest unit and never below `MINIMUM_FARE`.
pub fn estimate_fare(pickup: &Location, dropoff: &Location, ride_class: RideClass) -> u64 {
    let distance_km = haversine_km(pickup, dropoff);
    let fare = BASE_FARE + distance_km * PER_KM_RATE * ride_class.multiplier();

    (fare.round() as u64).max(MINIMUM_FARE)
}

pub fn fare_for_ride(ride: &Ride) -> u64 {
    estimate_fare(&ride.pickup, &ride.dropoff, ride.ride_class)
}

#[cfg(test)]
mod tests {
    use super::{estimate_fare, MINIMUM_FARE};
    use crate::geo::haversine_km;
    use crate::models::ride::{Location, RideClass};

    fn place(name: &str, latitude: f64, longitude: f64) -> Location {
        Location {
            latitude,
            longitude,
            name: name.to_string(),
        }
    }

    fn gulshan() -> Location {
        place("Gulshan-e-Iqbal", 24.9036, 67.1571)
    }

    fn saddar() -> Location {
        place("Saddar", 24.8103, 66.9940)
    }

    #[test]
    fn fare_is_symmetric() {
        for class in [RideClass::Standard, RideClass::Premium] {
            assert_eq!(
                estimate_fare(&gulshan(), &saddar(), class),
                estimate_fare(&saddar(), &gulshan(), class)
            );
        }
    }

    #[test]
    fn same_point_costs_the_minimum() {
        for class in [RideClass::Standard, RideClass::Premium] {
            assert_eq!(estimate_fare(&saddar(), &saddar(), class), MINIMUM_FARE);
        }
    }

    #[test]
    fn short_trip_is_floored_at_minimum() {
        let a = place("Tower", 24.8607, 67.0011);
        let b = place("Kharadar", 24.8615, 67.0099);
        assert!(haversine_km(&a, &b) < 1.0);
        assert_eq!(estimate_fare(&a, &b, RideClass::Standard), MINIMUM_FARE);
    }

    #[test]
    fn cross_city_standard_trip() {
        let distance = haversine_km(&gulshan(), &saddar());
        assert!((distance - 19.45).abs() < 0.01);
        // 50 + 19.453 * 30 = 633.59
        assert_eq!(estimate_fare(&gulshan(), &saddar(), RideClass::Standard), 634);
    }

    #[test]
    fn premium_applies_multiplier_to_distance_only() {
        // 50 + 19.453 * 30 * 1.5 = 925.39
        assert_eq!(estimate_fare(&gulshan(), &saddar(), RideClass::Premium), 925);
    }
}
