use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// NaN components are never in range.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[test]
fn coordinates_bounds_are_inclusive() {
    assert!(Coordinates::new(90.0, 180.0).is_valid());
    assert!(Coordinates::new(-90.0, -180.0).is_valid());
    assert!(Coordinates::new(-6.188225, 106.698526).is_valid());

    assert!(!Coordinates::new(90.000001, 0.0).is_valid());
    assert!(!Coordinates::new(0.0, -180.5).is_valid());
}

#[test]
fn nan_coordinates_are_invalid() {
    assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    assert!(!Coordinates::new(0.0, f64::NAN).is_valid());
    assert!(!Coordinates::new(f64::INFINITY, 0.0).is_valid());
}
