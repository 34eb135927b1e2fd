pub mod config;
pub mod models;
pub mod pipeline;

pub use pipeline::processor::{build_processor, AppointmentProcessor, ProcessOutcome, ProcessReport};

use tracing_subscriber::EnvFilter;

/// Initialize tracing on stderr. Filter from `RUST_LOG`, else [`config::default_log_filter`].
/// Calling it again is a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
