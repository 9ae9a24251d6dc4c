//! Great-circle distance between coordinates.

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A (latitude, longitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Create a new coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Haversine great-circle distance between two points, in kilometres.
///
/// Symmetric, and zero for coincident points.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUBLIN: Coordinates = Coordinates {
        latitude: 53.3498,
        longitude: -6.2603,
    };
    const CORK: Coordinates = Coordinates {
        latitude: 51.8985,
        longitude: -8.4756,
    };

    #[test]
    fn zero_at_zero_separation() {
        assert_eq!(haversine_km(DUBLIN, DUBLIN), 0.0);
    }

    #[test]
    fn symmetric() {
        let ab = haversine_km(DUBLIN, CORK);
        let ba = haversine_km(CORK, DUBLIN);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn dublin_to_cork_is_about_220km() {
        let d = haversine_km(DUBLIN, CORK);
        assert!((215.0..225.0).contains(&d), "got {d}");
    }

    #[test]
    fn small_separation_is_small() {
        let a = Coordinates::new(53.3498, -6.2603);
        let b = Coordinates::new(53.3508, -6.2603);
        let d = haversine_km(a, b);
        assert!(d > 0.0 && d < 0.2, "got {d}");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn coordinate() -> impl Strategy<Value = Coordinates> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lon)| Coordinates::new(lat, lon))
    }

    proptest! {
        /// d(A, B) = d(B, A) within floating tolerance.
        #[test]
        fn symmetric(a in coordinate(), b in coordinate()) {
            let ab = haversine_km(a, b);
            let ba = haversine_km(b, a);
            prop_assert!((ab - ba).abs() < 1e-6);
        }

        /// Distances are non-negative and bounded by half the circumference.
        #[test]
        fn bounded(a in coordinate(), b in coordinate()) {
            let d = haversine_km(a, b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= EARTH_RADIUS_KM * std::f64::consts::PI + 1e-6);
        }

        /// d(A, A) = 0 for every coordinate.
        #[test]
        fn zero_on_self(a in coordinate()) {
            prop_assert!(haversine_km(a, a).abs() < 1e-9);
        }
    }
}
