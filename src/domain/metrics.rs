use std::sync::Arc;
use std::time::Instant;

/// Abstraction for application metrics (counters, histograms).
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// Record a successful account registration.
    fn record_registration(&self);

    /// Record a login attempt and whether it produced a session.
    fn record_login(&self, success: bool);

    /// Record an item appended to a favorites list.
    fn record_favorite_added(&self);

    /// Record an item removed from a favorites list.
    fn record_favorite_removed(&self);

    /// Record HTTP request duration and labels.
    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
