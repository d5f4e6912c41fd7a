//! Great-circle distance and travel-time estimates between positions.

use super::Position;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Assumed average urban response speed used for ETA estimates.
pub const RESPONSE_SPEED_KMH: f64 = 35.0;

/// Haversine distance in kilometres.
pub fn distance_km(from: &Position, to: &Position) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = (to.latitude - from.latitude).to_radians();
    let dlng = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Whole minutes to cover `distance_km` at [`RESPONSE_SPEED_KMH`], rounded up.
///
/// Any non-zero distance takes at least one minute.
pub fn eta_minutes(distance_km: f64) -> u32 {
    if distance_km <= 0.0 || !distance_km.is_finite() {
        return 0;
    }
    let minutes = (distance_km / RESPONSE_SPEED_KMH * 60.0).ceil();
    (minutes as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_same_point_is_zero() {
        let p = Position::new(40.7128, -74.0060);
        assert!(distance_km(&p, &p).abs() < 1e-9);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(1.0, 0.0);
        assert!((distance_km(&a, &b) - 111.195).abs() < 0.01);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Position::new(40.7128, -74.0060);
        let b = Position::new(40.7589, -73.9851);
        assert!((distance_km(&a, &b) - distance_km(&b, &a)).abs() < 1e-9);
        // Lower Manhattan to Midtown
        let d = distance_km(&a, &b);
        assert!(d > 5.0 && d < 6.0, "got {d}");
    }

    #[test]
    fn test_eta_minutes() {
        assert_eq!(eta_minutes(0.0), 0);
        assert_eq!(eta_minutes(0.01), 1);
        assert_eq!(eta_minutes(2.3), 4);
        assert_eq!(eta_minutes(35.0), 60);
        assert_eq!(eta_minutes(f64::NAN), 0);
    }
}
