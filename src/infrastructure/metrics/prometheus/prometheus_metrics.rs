//! Prometheus metrics implementation.
//!
//! Delegates to the helpers in `counters.rs` and `recorder.rs`, which use the
//! global `metrics` crate registry. Metrics are registered on first use and a
//! single global handle renders them in Prometheus text format.

use crate::domain::Metrics;
use std::time::Instant;

/// Prometheus-based metrics implementation.
///
/// Empty because all state lives in the global recorder installed by
/// `init_metrics`.
#[derive(Default)]
pub struct PrometheusMetrics {}

impl PrometheusMetrics {
    pub fn new() -> Self {
        tracing::info!("Creating Prometheus metrics");
        PrometheusMetrics {}
    }
}

impl Metrics for PrometheusMetrics {
    fn render(&self) -> String {
        super::render_metrics()
    }

    fn record_registration(&self) {
        super::increment_registrations();
    }

    fn record_login(&self, success: bool) {
        super::increment_logins(success);
    }

    fn record_favorite_added(&self) {
        super::increment_favorites("add");
    }

    fn record_favorite_removed(&self) {
        super::increment_favorites("remove");
    }

    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16) {
        super::track_http_request(start, path, method, status);
    }
}
