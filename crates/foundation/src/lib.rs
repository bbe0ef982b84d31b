pub mod lonlat;
pub mod math;

// Foundation crate: small, well-tested primitives only.
pub use lonlat::*;
