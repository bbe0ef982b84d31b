use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected WGS84 input.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordError {
    #[error("coordinate is not finite: [{lon}, {lat}]")]
    NotFinite { lon: f64, lat: f64 },
    #[error("latitude {lat} outside [-90, 90]")]
    LatitudeOutOfRange { lat: f64 },
}

/// WGS84 position in decimal degrees, GeoJSON axis order.
///
/// Serializes as a `[lon, lat]` array. Longitude is not wrapped: map surfaces
/// that render world copies may report values beyond ±180 and those are kept
/// as given.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    /// Unchecked constructor for coordinates produced by code, not users.
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn try_new(lon: f64, lat: f64) -> Result<Self, CoordError> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(CoordError::NotFinite { lon, lat });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordError::LatitudeOutOfRange { lat });
        }
        Ok(Self { lon, lat })
    }

    /// Returns a copy shifted by the given number of degrees on each axis.
    pub fn offset(self, d_lon: f64, d_lat: f64) -> Self {
        Self::new(self.lon + d_lon, self.lat + d_lat)
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl TryFrom<[f64; 2]> for LonLat {
    type Error = CoordError;

    fn try_from(value: [f64; 2]) -> Result<Self, Self::Error> {
        Self::try_new(value[0], value[1])
    }
}

impl From<LonLat> for [f64; 2] {
    fn from(value: LonLat) -> Self {
        value.to_array()
    }
}

impl std::fmt::Display for LonLat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.6}, {:.6}]", self.lon, self.lat)
    }
}

#[cfg(test)]
mod tests {
    use super::{CoordError, LonLat};

    #[test]
    fn try_new_rejects_non_finite() {
        assert!(matches!(
            LonLat::try_new(f64::NAN, 0.0),
            Err(CoordError::NotFinite { .. })
        ));
        assert!(matches!(
            LonLat::try_new(0.0, f64::INFINITY),
            Err(CoordError::NotFinite { .. })
        ));
    }

    #[test]
    fn try_new_rejects_latitude_beyond_poles() {
        assert_eq!(
            LonLat::try_new(0.0, 90.5),
            Err(CoordError::LatitudeOutOfRange { lat: 90.5 })
        );
        assert!(LonLat::try_new(0.0, -90.0).is_ok());
    }

    #[test]
    fn longitude_is_not_wrapped() {
        let p = LonLat::try_new(190.0, 10.0).expect("valid");
        assert_eq!(p.lon, 190.0);
    }

    #[test]
    fn serde_uses_geojson_axis_order() {
        let p = LonLat::new(139.7, 35.6);
        let json = serde_json::to_string(&p).expect("serialize");
        assert_eq!(json, "[139.7,35.6]");

        let back: LonLat = serde_json::from_str("[1.5,-2.25]").expect("deserialize");
        assert_eq!(back, LonLat::new(1.5, -2.25));

        assert!(serde_json::from_str::<LonLat>("[0.0,123.0]").is_err());
    }

    #[test]
    fn display_uses_six_decimals() {
        assert_eq!(LonLat::new(1.0, -2.5).to_string(), "[1.000000, -2.500000]");
    }
}
