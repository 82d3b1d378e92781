use axum::http::{header, StatusCode};
use axum::Router;
use common::{body_text, get, post_form, send, sign_up_and_login, test_app};
use joke_favorites::{build_router, create_prom_metrics};
use serial_test::serial;
use std::sync::Arc;

mod common;

// NOTE: Prometheus metrics use a global recorder shared by every test in
// this binary. Tests that install it are serial so counters from one test
// are not observed half-written by another.

fn prom_app() -> Router {
    // ---
    let metrics = create_prom_metrics().expect("Prometheus recorder installs");
    build_router(common::test_state_with_metrics(metrics))
}

#[tokio::test]
#[serial]
async fn metrics_endpoint_with_prometheus() {
    // ---
    let app = prom_app();

    // First, hit some endpoints to generate metrics
    send(&app, get("/health", None)).await;
    send(&app, get("/", None)).await;
    send(&app, get("/favoritos", None)).await;

    let response = send(&app, get("/metrics", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("http_requests_total"), "{body}");
    assert!(body.contains(r#"path="/health""#), "{body}");
    assert!(body.contains(r#"path="/favoritos""#), "{body}");
    assert!(body.contains(r#"status="401""#), "{body}");
}

#[tokio::test]
#[serial]
async fn metrics_record_account_and_favorites_activity() {
    // ---
    let app = prom_app();

    let cookie = sign_up_and_login(&app, "metrics-user", "secret123").await;
    send(
        &app,
        post_form("/login", "username=metrics-user&password=nope", None),
    )
    .await;
    send(&app, post_form("/addToFavorites", "joke=5", Some(&cookie))).await;
    send(
        &app,
        post_form("/removeFromFavorites/0", "", Some(&cookie)),
    )
    .await;

    let body = body_text(send(&app, get("/metrics", None)).await).await;
    assert!(body.contains("users_registered_total"), "{body}");
    assert!(body.contains(r#"logins_total{outcome="success"}"#), "{body}");
    assert!(body.contains(r#"logins_total{outcome="failure"}"#), "{body}");
    assert!(body.contains(r#"favorites_mutations_total{action="add"}"#), "{body}");
    assert!(body.contains(r#"favorites_mutations_total{action="remove"}"#), "{body}");
}

#[tokio::test]
async fn metrics_endpoint_with_noop() {
    // ---
    let app = test_app();

    send(&app, get("/health", None)).await;

    let response = send(&app, get("/metrics", None)).await;

    // Should still return success even with noop metrics
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "");
}

#[tokio::test]
#[serial]
async fn metrics_endpoint_survives_load() {
    // ---
    let app = Arc::new(prom_app());

    // Generate some load
    let requests = (0..20).map(|i| {
        let app = Arc::clone(&app);
        async move {
            let endpoint = match i % 3 {
                0 => "/health",
                1 => "/",
                _ => "/metrics",
            };
            send(&app, get(endpoint, None)).await.status()
        }
    });

    let statuses = futures::future::join_all(requests).await;

    for (i, status) in statuses.into_iter().enumerate() {
        assert_eq!(status, StatusCode::OK, "Request {i} should return success");
    }

    let body = body_text(send(&app, get("/metrics", None)).await).await;
    assert!(!body.is_empty());
}

#[tokio::test]
async fn metrics_content_type_is_correct() {
    // ---
    let response = send(&test_app(), get("/metrics", None)).await;

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        content_type.starts_with("text/plain"),
        "Content type should be Prometheus text: {content_type}"
    );
}
