//! Logging and tracing infrastructure for fang.
//!
//! The engine itself only emits `tracing` events; embedding applications
//! decide whether and how to install a subscriber. These helpers cover the
//! common cases of human-readable or JSON output filtered by `RUST_LOG`.

use std::sync::Once;
#[allow(unused_imports)]
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static INIT: Once = Once::new();

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global tracing subscriber.
///
/// Subsequent calls (of either initializer) are ignored. If another
/// subscriber is already installed the call is a no-op.
pub fn init_tracing() {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        if tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt_layer)
            .try_init()
            .is_ok()
        {
            info!("fang tracing initialized");
        }
    });
}

/// Initialize tracing with JSON output for structured logging.
pub fn init_tracing_json() {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_current_span(true);

        if tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt_layer)
            .try_init()
            .is_ok()
        {
            info!("fang tracing initialized (JSON mode)");
        }
    });
}

/// Initialize logging from Python
#[cfg(feature = "python-ext")]
#[pyo3::prelude::pyfunction]
pub fn init_logging(json: bool) -> pyo3::PyResult<()> {
    if json {
        init_tracing_json();
    } else {
        init_tracing();
    }
    Ok(())
}
