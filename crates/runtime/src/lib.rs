pub mod config;
pub mod event;
pub mod event_bus;
pub mod registry;
pub mod session;
pub mod surface;

pub use config::*;
pub use event::*;
pub use event_bus::*;
pub use registry::*;
pub use session::*;
pub use surface::*;
