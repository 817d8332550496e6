//! Tracing subscriber setup.
//!
//! Environment variables:
//!   `RUST_LOG`   - standard env filter (default: `bestphoto=info,tower_http=info`)
//!   `LOG_FORMAT` - `json` or `text` (default: `text`)

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
#[must_use]
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "bestphoto=debug,tower_http=debug"
    } else {
        "bestphoto=info,tower_http=info"
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean for results.
pub fn init(verbose: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose).into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f == "json");

    let registry = tracing_subscriber::registry().with(env_filter);
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)).try_init()
    };
}
