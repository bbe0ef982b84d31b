/// Mean Earth radius (meters), IUGG / GRS80.
///
/// Shared by the haversine distance, the Web Mercator metre scale and the
/// degree/length conversions so that all three agree on one sphere.
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Circumference of the mean sphere (meters).
pub const EARTH_CIRCUMFERENCE_M: f64 = 2.0 * std::f64::consts::PI * MEAN_EARTH_RADIUS_M;

/// Arc length on the mean sphere subtended by `deg` degrees.
pub fn degrees_to_meters(deg: f64) -> f64 {
    deg.to_radians() * MEAN_EARTH_RADIUS_M
}

/// Central angle (degrees) subtended by an arc of `meters` on the mean sphere.
pub fn meters_to_degrees(meters: f64) -> f64 {
    (meters / MEAN_EARTH_RADIUS_M).to_degrees()
}
