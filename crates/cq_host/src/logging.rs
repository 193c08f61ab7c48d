//! Log output for the host driver.
//!
//! The queue crates emit `tracing` events; this installs the subscriber that
//! prints them. Filtering follows `RUST_LOG`, e.g. `RUST_LOG=cq_core=trace`
//! to see every append and overwrite.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_names(true)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .init();
}
