use foundation::LonLat;
use foundation::math::{degrees_to_meters, meters_to_degrees};
use geo::{Geometry, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

/// Length units accepted by provider operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Kilometers,
    /// Arc length on the mean sphere expressed as a central angle.
    Degrees,
}

impl Units {
    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            Units::Kilometers => value * 1000.0,
            Units::Degrees => degrees_to_meters(value),
        }
    }

    pub fn from_meters(self, meters: f64) -> f64 {
        match self {
            Units::Kilometers => meters / 1000.0,
            Units::Degrees => meters_to_degrees(meters),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DistanceMethod {
    /// Great-circle distance on the mean sphere.
    Haversine,
    /// Constant-bearing (loxodrome) distance.
    Rhumb,
    /// Straight line on the Web Mercator plane, rescaled at the mid-point latitude.
    WebMercator,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CircleOptions {
    /// Number of vertices of the polygonal approximation.
    pub steps: usize,
    pub units: Units,
}

impl Default for CircleOptions {
    fn default() -> Self {
        Self {
            steps: 64,
            units: Units::Kilometers,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BufferOptions {
    /// Segments per quarter circle used for rounded corners.
    pub steps: usize,
    pub units: Units,
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            steps: 8,
            units: Units::Kilometers,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SimplifyOptions {
    /// Maximum deviation, in coordinate units (degrees).
    pub tolerance: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOp {
    #[default]
    Union,
    Intersect,
    Difference,
}

impl BooleanOp {
    pub const ALL: [BooleanOp; 3] = [BooleanOp::Union, BooleanOp::Intersect, BooleanOp::Difference];

    pub fn as_str(self) -> &'static str {
        match self {
            BooleanOp::Union => "union",
            BooleanOp::Intersect => "intersect",
            BooleanOp::Difference => "difference",
        }
    }
}

/// Black-box computational geometry used by the labs.
///
/// Coordinates are WGS84 degrees. Degenerate input yields `None` rather than
/// an error; callers skip absent results instead of failing.
pub trait GeometryProvider {
    fn distance(&self, a: LonLat, b: LonLat, method: DistanceMethod, units: Units) -> f64;

    /// Points along the great circle from `a` to `b`, both ends included.
    /// Returns one part, or two when the path crosses the antimeridian.
    fn great_circle(&self, a: LonLat, b: LonLat, npoints: usize) -> Vec<Vec<LonLat>>;

    fn circle(&self, center: LonLat, radius: f64, opts: CircleOptions) -> Option<Polygon<f64>>;

    fn buffer(
        &self,
        geometry: &Geometry<f64>,
        radius: f64,
        opts: BufferOptions,
    ) -> Option<MultiPolygon<f64>>;

    /// Spherical area in square meters. Zero for non-areal geometries.
    fn area(&self, geometry: &Geometry<f64>) -> f64;

    /// Planar shoelace area in degree², positive for a counter-clockwise exterior.
    fn planar_signed_area(&self, polygon: &Polygon<f64>) -> f64;

    /// Points on an edge count as inside unless `ignore_boundary` is set.
    fn point_in_polygon(&self, point: LonLat, polygon: &Geometry<f64>, ignore_boundary: bool)
    -> bool;

    fn point_on_boundary(&self, point: LonLat, polygon: &Geometry<f64>) -> bool;

    /// `None` when the result is empty (e.g. intersecting disjoint inputs).
    fn boolean_op(
        &self,
        op: BooleanOp,
        a: &MultiPolygon<f64>,
        b: &MultiPolygon<f64>,
    ) -> Option<MultiPolygon<f64>>;

    /// Idempotent: simplifying the output again with the same options changes nothing.
    fn simplify(&self, geometry: &Geometry<f64>, opts: SimplifyOptions) -> Geometry<f64>;

    /// Exterior rings counter-clockwise, holes clockwise. Only vertex order changes.
    fn rewind(&self, geometry: &Geometry<f64>) -> Geometry<f64>;

    fn is_ccw(&self, ring: &LineString<f64>) -> bool;
}
