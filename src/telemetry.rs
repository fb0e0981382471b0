use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Installs the global subscriber. Logs go to stderr so command output on
/// stdout stays machine-readable.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|e| {
        eprintln!("Warning: invalid log level '{}': {}", config.level, e);
        EnvFilter::new("info")
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("Warning: logging already initialized: {}", e);
    }
}

pub fn install_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Counts one storage operation by name and outcome.
pub fn record_operation(operation: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::increment_counter!(
        "wanderlist_storage_operations_total",
        "operation" => operation,
        "outcome" => outcome
    );
}
