//! Tracing subscriber initialization with structured, optionally JSON, output.
//!
//! # Usage
//!
//! ```no_run
//! // Human-readable logs at the given default level
//! chatkeep_observe::tracing_setup::init_tracing("info", false).unwrap();
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Map CLI verbosity flags to a default filter directive.
pub fn verbosity_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "info",
        1 => "info,chatkeep=debug",
        _ => "trace",
    }
}

/// Build the filter: `RUST_LOG` when set and valid, otherwise `default_directive`.
pub fn build_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Initialize the global tracing subscriber.
///
/// - Installs a `fmt` layer with target visibility and span close timing.
/// - When `json` is true, events are written as newline-delimited JSON.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub fn init_tracing(default_directive: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = build_filter(default_directive);

    if json {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}
