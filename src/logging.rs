//! Diagnostic tracing for the CLI
//!
//! Library code only emits `tracing` events; installing a subscriber is
//! left to the binary. Output goes to stderr so stdout carries nothing but
//! answers.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a stderr subscriber
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `debug` over the
/// default `warn`.
pub fn init(verbose: bool) {
    let fallback = if verbose { "railswitch=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (e.g. from tests) is harmless, so ignore the error
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
