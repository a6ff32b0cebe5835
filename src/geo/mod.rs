use crate::models::ride::Location;

const EARTH_RADIUS_KM: f64 = 6_371.0;

pub fn haversine_km(a: &Location, b: &Location) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// Rejects coordinates that cannot name a point on the globe.
pub fn validate_location(location: &Location) -> Result<(), String> {
    if location.name.trim().is_empty() {
        return Err("location name cannot be empty".to_string());
    }
    if !location.latitude.is_finite() || !(-90.0..=90.0).contains(&location.latitude) {
        return Err(format!("latitude {} out of range", location.latitude));
    }
    if !location.longitude.is_finite() || !(-180.0..=180.0).contains(&location.longitude) {
        return Err(format!("longitude {} out of range", location.longitude));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{haversine_km, validate_location};
    use crate::models::ride::Location;

    fn at(latitude: f64, longitude: f64) -> Location {
        Location {
            latitude,
            longitude,
            name: "somewhere".to_string(),
        }
    }

    #[test]
    fn zero_distance_for_same_point() {
        let p = at(24.8607, 67.0011);
        assert!(haversine_km(&p, &p) < 1e-9);
    }

    #[test]
    fn london_to_paris_is_around_343_km() {
        let distance = haversine_km(&at(51.5074, -0.1278), &at(48.8566, 2.3522));
        assert!((distance - 343.0).abs() < 5.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = at(24.9036, 67.1571);
        let b = at(24.8103, 66.9940);
        assert_eq!(haversine_km(&a, &b), haversine_km(&b, &a));
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(validate_location(&at(91.0, 0.0)).is_err());
        assert!(validate_location(&at(0.0, -180.5)).is_err());
        assert!(validate_location(&at(f64::NAN, 0.0)).is_err());
        assert!(validate_location(&at(24.86, 67.0)).is_ok());
    }

    #[test]
    fn rejects_blank_name() {
        let mut location = at(24.86, 67.0);
        location.name = "  ".to_string();
        assert!(validate_location(&location).is_err());
    }
}
