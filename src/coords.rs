//! Latitude and longitude coordinates for stations.

/// The latitude and longitude of a station.
///
/// Coordinates are stored in the index as integer hundred-thousandths of a
/// degree so that equality filters on them are exact.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coords {
    pub lat: f64,
    pub lon: f64,
}

/// Scale factor between degrees and the integer representation in the index.
pub(crate) const COORD_SCALE: f64 = 100_000.0;

/// Scale one coordinate in degrees to its integer representation.
pub(crate) fn scaled(degrees: f64) -> i64 {
    (degrees * COORD_SCALE).round() as i64
}

impl Coords {
    /// Latitude as an integer number of hundred-thousandths of a degree.
    pub(crate) fn lat_scaled(&self) -> i64 {
        (self.lat * COORD_SCALE).round() as i64
    }

    /// Longitude as an integer number of hundred-thousandths of a degree.
    pub(crate) fn lon_scaled(&self) -> i64 {
        (self.lon * COORD_SCALE).round() as i64
    }

    /// Rebuild coordinates from their integer representation.
    pub(crate) fn from_scaled(lat: i64, lon: i64) -> Self {
        Coords {
            lat: lat as f64 / COORD_SCALE,
            lon: lon as f64 / COORD_SCALE,
        }
    }
}

impl From<(f64, f64)> for Coords {
    fn from(pair: (f64, f64)) -> Self {
        Self {
            lat: pair.0,
            lon: pair.1,
        }
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_scaled_round_trip() {
        let coords = Coords::from((12.34560, 76.54320));
        let back = Coords::from_scaled(coords.lat_scaled(), coords.lon_scaled());
        assert_eq!(coords, back);
    }

    #[test]
    fn test_scaling() {
        let coords = Coords::from((12.34560, -76.54320));
        assert_eq!(coords.lat_scaled(), 1_234_560);
        assert_eq!(coords.lon_scaled(), -7_654_320);
    }
}
