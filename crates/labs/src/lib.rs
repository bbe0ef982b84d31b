//! Lab Units: small, stateful experiments that turn accumulated map clicks
//! into GeoJSON through a [`geometry::GeometryProvider`].
//!
//! Each lab owns a concrete state type implementing [`Lab`]; [`LabState`]
//! is the closed set of those types and is what the runtime stores.

pub mod accumulate;
pub mod contract;
pub mod panel;
pub mod patch;
pub mod state;

pub mod buffer_circle;
pub mod distance;
pub mod great_circle;
pub mod point_in_polygon;
pub mod polygon_ops;
pub mod rewind;
pub mod simplify;

pub use accumulate::*;
pub use contract::*;
pub use panel::*;
pub use patch::*;
pub use state::*;

pub use buffer_circle::BufferCircleLab;
pub use distance::DistanceLab;
pub use great_circle::GreatCircleLab;
pub use point_in_polygon::{Classification, PointInPolygonLab};
pub use polygon_ops::PolygonOpsLab;
pub use rewind::RewindLab;
pub use simplify::SimplifyLab;
