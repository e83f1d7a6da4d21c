//! Structured dispatch telemetry.
//!
//! Separate from the plain debug log: the gateway emits `tracing` events with
//! per-command timing fields, and this module routes them to a JSON-lines file
//! so they can be post-processed without parsing free-form text.

use crate::config::AppConfig;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_subscriber::fmt::time::UtcTime;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

pub(crate) fn tracing_log_path() -> PathBuf {
    env::var("SCENEBRIDGE_TRACE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("scenebridge_trace.jsonl"))
}

/// Install the global JSON subscriber. Events only flow once `--logs` or
/// `--log-timings` is set; with `--no-logs` this is a no-op.
pub fn init_tracing(config: &AppConfig) {
    if config.no_logs || !(config.logs || config.log_timings) {
        return;
    }

    let _ = TRACING_INIT.get_or_init(|| {
        let Ok(file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(tracing_log_path())
        else {
            return;
        };
        let subscriber = tracing_subscriber::fmt()
            .json()
            .flatten_event(true)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(file)
            .with_current_span(false)
            .with_span_list(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
