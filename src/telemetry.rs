//! Tracing initialization.
//!
//! Soft failures during action resolution (missing descriptors, unparseable
//! metadata) are reported through `tracing::warn!` rather than surfaced as
//! errors, so a subscriber must be installed for them to be visible.
//!
//! Filtering is controlled with `RUST_LOG` (e.g. `RUST_LOG=actionsmith=debug`).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Initialize the global tracing subscriber.
///
/// Safe to call once per process; later calls are ignored.
pub fn init_tracing() {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(tracing_subscriber::EnvFilter::from_default_env()),
        )
        .try_init();

    if let Err(e) = result {
        tracing::debug!("tracing subscriber already installed: {}", e);
    }
}
