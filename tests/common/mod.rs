// Test helpers are intentionally partially used
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use joke_favorites::domain::MetricsPtr;
use joke_favorites::{
    build_router, create_memory_repository, create_noop_metrics, AppState, SessionConfig,
    StoreConfig, SESSION_COOKIE,
};
use reqwest::Client;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;

pub const TEST_SECRET: &str = "integration-test-secret";

// ============================================================================
// Test Setup
// ============================================================================

pub fn session_config() -> SessionConfig {
    // ---
    SessionConfig {
        secret: TEST_SECRET.to_string(),
        domain: "localhost".to_string(),
        ttl: Duration::from_secs(2_592_000),
    }
}

/// Application state over a fresh in-memory store.
pub fn test_state_with_metrics(metrics: MetricsPtr) -> AppState {
    // ---
    AppState::new(
        &session_config(),
        &StoreConfig::memory(),
        create_memory_repository(),
        metrics,
    )
}

pub fn test_app() -> Router {
    // ---
    build_router(test_state_with_metrics(
        create_noop_metrics().expect("noop metrics"),
    ))
}

// ============================================================================
// Request helpers
// ============================================================================

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    // ---
    use tower::ServiceExt;

    app.clone()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

pub fn get(path: &str, cookie: Option<&str>) -> Request<Body> {
    // ---
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(path: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    // ---
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn post_json(path: &str, body: serde_json::Value, cookie: Option<&str>) -> Request<Body> {
    // ---
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_text(response: Response) -> String {
    // ---
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub async fn body_json(response: Response) -> serde_json::Value {
    // ---
    serde_json::from_str(&body_text(response).await).expect("JSON body")
}

pub fn location(response: &Response) -> Option<&str> {
    // ---
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// The raw `Set-Cookie` header for the session cookie, if the response sets one.
pub fn session_set_cookie(response: &Response) -> Option<String> {
    // ---
    let prefix = format!("{SESSION_COOKIE}=");
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .map(str::to_string)
}

/// `jwt=<token>` ready to send back in a `Cookie` header.
pub fn cookie_pair(set_cookie: &str) -> String {
    // ---
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .trim()
        .to_string()
}

/// Registers and logs in, returning the `Cookie` header value for the session.
pub async fn sign_up_and_login(app: &Router, username: &str, password: &str) -> String {
    // ---
    let body = format!("username={username}&password={password}");

    let response = send(app, post_form("/registrar", &body, None)).await;
    assert_eq!(response.status(), StatusCode::FOUND, "registration failed");

    let response = send(app, post_form("/login", &body, None)).await;
    assert_eq!(response.status(), StatusCode::FOUND, "login failed");

    cookie_pair(&session_set_cookie(&response).expect("login sets the session cookie"))
}

// ============================================================================
// Live server
// ============================================================================

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
}

impl TestServer {
    // ---
    pub async fn new(app: Router) -> Self {
        // --
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        // Redirects are asserted on, not followed.
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self { addr, client }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }
}
