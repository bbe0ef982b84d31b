//! Geometry provider boundary.
//!
//! Labs never compute geometry themselves: every distance, buffer, clip,
//! containment test or simplification goes through [`GeometryProvider`].
//! [`GeoProvider`] is the default implementation on top of the `geo` crate.

pub mod convert;
pub mod geo_provider;
pub mod provider;

pub use convert::*;
pub use geo_provider::GeoProvider;
pub use provider::*;
