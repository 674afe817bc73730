pub mod config;
pub mod tableau;
pub mod telemetry;

pub use config::Config;
pub use tableau::{SearchHit, Session, TableauClient, TableauError, ViewContent};
pub use telemetry::{TelemetryError, TelemetryGuard, init_logging, init_telemetry};
