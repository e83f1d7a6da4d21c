pub mod bridge;
pub mod config;
pub mod host;
mod lock;
pub mod logging;
pub mod scene;
mod telemetry;

pub(crate) use lock::lock_or_recover;
pub use logging::{init_logging, log_debug, log_file_path, log_panic};
pub use telemetry::init_tracing;
