//! Web Mercator (EPSG:3857) helpers in normalized units.
//!
//! Coordinates follow the map-surface convention: `x` and `y` are in `[0, 1]`
//! across the world, `y` grows southwards. Distances measured here are screen
//! distances, not ground distances; [`mercator_distance_m`] rescales them with
//! the metre size at the mid-point latitude, which is only reasonable for
//! short, mostly east-west separations.

use super::geodesy::EARTH_CIRCUMFERENCE_M;
use crate::LonLat;

/// Latitude limit of the square Web Mercator world.
pub const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_78;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MercatorCoord {
    pub x: f64,
    pub y: f64,
}

impl MercatorCoord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn from_lon_lat(p: LonLat) -> Self {
        Self::new(mercator_x_from_lon(p.lon), mercator_y_from_lat(p.lat))
    }

    pub fn lat_deg(&self) -> f64 {
        lat_from_mercator_y(self.y)
    }

    /// Size of one ground metre at this coordinate's latitude, in mercator units.
    pub fn meter_in_units(&self) -> f64 {
        1.0 / EARTH_CIRCUMFERENCE_M / self.lat_deg().to_radians().cos()
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

pub fn mercator_x_from_lon(lon_deg: f64) -> f64 {
    (180.0 + lon_deg) / 360.0
}

pub fn mercator_y_from_lat(lat_deg: f64) -> f64 {
    let lat = lat_deg.clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG);
    let ln = (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (180.0 - ln.to_degrees()) / 360.0
}

pub fn lat_from_mercator_y(y: f64) -> f64 {
    let y2 = 180.0 - y * 360.0;
    (360.0 / std::f64::consts::PI) * (y2.to_radians().exp()).atan() - 90.0
}

/// Planar distance between two points on the Web Mercator plane, in ground
/// metres at the mid-point latitude.
pub fn mercator_distance_m(a: LonLat, b: LonLat) -> f64 {
    let ma = MercatorCoord::from_lon_lat(a);
    let mb = MercatorCoord::from_lon_lat(b);
    let dx = mb.x - ma.x;
    let dy = mb.y - ma.y;
    let units = (dx * dx + dy * dy).sqrt();
    units / ma.midpoint(&mb).meter_in_units()
}

#[cfg(test)]
mod tests {
    use super::{MercatorCoord, lat_from_mercator_y, mercator_distance_m, mercator_y_from_lat};
    use crate::LonLat;
    use crate::math::degrees_to_meters;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn origin_maps_to_world_center() {
        let m = MercatorCoord::from_lon_lat(LonLat::new(0.0, 0.0));
        assert_close(m.x, 0.5, 1e-12);
        assert_close(m.y, 0.5, 1e-12);
    }

    #[test]
    fn latitude_round_trips() {
        for lat in [-80.0, -45.0, -1.0, 0.0, 12.5, 60.0, 85.0] {
            assert_close(lat_from_mercator_y(mercator_y_from_lat(lat)), lat, 1e-9);
        }
    }

    #[test]
    fn north_is_up() {
        assert!(mercator_y_from_lat(10.0) < mercator_y_from_lat(0.0));
    }

    #[test]
    fn equatorial_distance_matches_arc_length() {
        let d = mercator_distance_m(LonLat::new(0.0, 0.0), LonLat::new(1.0, 0.0));
        assert_close(d, degrees_to_meters(1.0), 1e-6);
    }

    #[test]
    fn east_west_distance_shrinks_with_latitude() {
        let equator = mercator_distance_m(LonLat::new(0.0, 0.0), LonLat::new(1.0, 0.0));
        let sixty = mercator_distance_m(LonLat::new(0.0, 60.0), LonLat::new(1.0, 60.0));
        assert_close(sixty / equator, 0.5, 1e-9);
    }
}
