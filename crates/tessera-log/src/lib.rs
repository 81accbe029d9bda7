//! Logging setup for Tessera binaries.
//!
//! Libraries only emit `tracing` events; the binary calls [`init_logging`]
//! once at startup. Console lines carry the uptime, target and thread name,
//! which identifies the `section-build-N` workers.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tessera_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config says otherwise.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// Name of the JSON log file written into the log directory.
pub const LOG_FILE_NAME: &str = "tessera.log";

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.debug.log_level`. When
/// `write_file` is set and `log_dir` can be created, events are also written
/// as JSON lines to [`LOG_FILE_NAME`] inside it.
///
/// Panics if a global subscriber is already installed.
///
/// ```no_run
/// tessera_log::init_logging(None, false, None);
/// ```
pub fn init_logging(log_dir: Option<&Path>, write_file: bool, config: Option<&Config>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let console = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_timer(fmt::time::uptime());

    let json_file = log_dir
        .filter(|_| write_file)
        .and_then(open_log_file)
        .map(|file| {
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_timer(fmt::time::uptime())
                .json()
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(json_file)
        .init();
}

fn open_log_file(dir: &Path) -> Option<File> {
    std::fs::create_dir_all(dir).ok()?;
    File::create(dir.join(LOG_FILE_NAME)).ok()
}

/// Filter directive taken from the config's `debug.log_level`, falling back to
/// [`DEFAULT_FILTER`] when absent or empty.
pub fn filter_directive(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.is_empty() => config.debug.log_level.clone(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Create an `EnvFilter` with the default filter string.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
