//! Prometheus metrics for the pricing service.
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, PricingMetrics};
//!
//! init_metrics()?;
//! PricingMetrics::record_classification("global");
//!
//! let app = Router::new().route("/metrics", get(metrics_handler));
//! ```

pub mod middleware;
pub mod pricing;

pub use middleware::metrics_middleware;
pub use pricing::{PricingMetrics, PricingTimer};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder once per process and return its handle
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();
        Ok(handle)
    })
}

pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for /metrics
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    describe_counter!(
        "pricing_location_lookups_total",
        "Location lookups by outcome (valid, invalid, timeout)"
    );
    describe_histogram!(
        "pricing_location_lookup_duration_seconds",
        "Location provider round trip in seconds"
    );
    describe_counter!(
        "pricing_classifications_total",
        "Zone classifications by resulting zone"
    );
    describe_counter!(
        "pricing_lock_attempts_total",
        "Lock attempts by outcome (created, already_locked)"
    );
    describe_counter!(
        "pricing_provisional_locks_total",
        "Locks written to the global zone because location was unavailable"
    );
    describe_counter!(
        "pricing_reevaluations_total",
        "Provisional lock re-evaluations by outcome"
    );
    describe_counter!(
        "pricing_not_registered_total",
        "Effective pricing reads for accounts without a lock"
    );
    describe_histogram!(
        "pricing_operation_duration_seconds",
        "Facade operation duration in seconds"
    );
}
