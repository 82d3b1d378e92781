use crate::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,

    /// Only reported by the full check.
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<&'static str>,
}

#[derive(Deserialize)]
pub struct HealthQuery {
    mode: Option<String>,
}

/// `GET /health` - liveness, and with `?mode=full` store reachability too.
///
/// The full check pings the document store under the same timeout as every
/// other store call and answers `503` with `{"status":"error","store":"unreachable"}`
/// when it fails or stalls.
pub async fn health_check(
    State(state): State<AppState>,
    Query(params): Query<HealthQuery>,
) -> (StatusCode, Json<HealthResponse>) {
    // ---
    if params.mode.as_deref() != Some("full") {
        return (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                store: None,
            }),
        );
    }

    let ping = state
        .store_calls()
        .once("ping", state.repository().ping())
        .await;

    match ping {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                store: Some("reachable"),
            }),
        ),
        Err(err) => {
            tracing::warn!("Full health check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "error",
                    store: Some("unreachable"),
                }),
            )
        }
    }
}
