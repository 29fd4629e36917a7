pub mod config;
pub mod driver;
pub mod error;
pub mod registry;
pub mod session;
pub mod store;

pub use driver::{Driver, DriverConfig, DriverEvent};
pub use error::HostError;
pub use registry::GameRegistry;
pub use session::{SessionCommand, SessionConfig, SessionEvent, SessionHandle, StopReason, spawn_session};
pub use store::ArcadeStore;
