use serde::{Deserialize, Serialize};

/// A fixed geographic bounding box in WGS84 coordinates (inclusive on all four
/// edges).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub const fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// The box center, used to position the map view.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// The valid display region for Egypt. Never mutated.
pub const EGYPT_BOUNDS: BoundingBox = BoundingBox::new(22.0, 31.8, 24.5, 37.0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn egypt_bounds_contain_cairo_but_not_athens() {
        assert!(EGYPT_BOUNDS.contains(30.04, 31.24)); // Cairo
        assert!(!EGYPT_BOUNDS.contains(37.98, 23.73)); // Athens
    }

    #[test]
    fn center_is_midpoint() {
        let (lat, lon) = EGYPT_BOUNDS.center();
        assert!((lat - 26.9).abs() < 1e-9);
        assert!((lon - 30.75).abs() < 1e-9);
    }
}
