use metrics::{counter, histogram, Label};
use std::time::Instant;

/// Increment the registered-users counter.
pub fn increment_registrations() {
    counter!("users_registered_total").increment(1);
}

/// Count a login attempt, labelled by outcome.
pub fn increment_logins(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("logins_total", "outcome" => outcome).increment(1);
}

/// Count a favorites mutation, labelled `add` or `remove`.
pub fn increment_favorites(action: &'static str) {
    counter!("favorites_mutations_total", "action" => action).increment(1);
}

/// Track HTTP request latency using a histogram, plus a request counter.
pub fn track_http_request(start: Instant, path: &str, method: &str, status: u16) {
    let elapsed = start.elapsed();
    let labels = vec![
        Label::new("path", path.to_string()),
        Label::new("method", method.to_string()),
        Label::new("status", status.to_string()),
    ];
    histogram!("http_request_duration_seconds", labels.clone()).record(elapsed);
    counter!("http_requests_total", labels).increment(1);
}
