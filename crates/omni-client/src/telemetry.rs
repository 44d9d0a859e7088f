//! Tracing initialisation for tooling client hosts.
//!
//! Call [`init_tracing`] once at program start. Later calls are ignored
//! since the global subscriber can only be set once per process.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events pass the default filter at the requested level.
const OMNI_TARGETS: [&str; 4] = ["omni_model", "omni_client", "omni_repository", "omni_cli"];

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. Without it, omni crates log at `level` and
/// everything else at `warn`. Thread names are included because fetch
/// outcomes are reported from runtime worker threads.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let layer = fmt::layer().with_target(false).with_thread_names(true);

    let registry = tracing_subscriber::registry().with(env_filter);
    let _ = if json {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer).try_init()
    };
}

fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    OMNI_TARGETS
        .iter()
        .fold("warn".to_string(), |acc, target| format!("{acc},{target}={level}"))
}
