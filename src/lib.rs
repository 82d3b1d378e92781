// src/lib.rs
use anyhow::Result;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use handlers::*;

// Public exports (visible outside this module)
pub mod domain;
pub mod services;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod handlers;
mod infrastructure;
mod session;

// Hoist up only the public symbol(s)
pub use app_state::AppState;
pub use handlers::SESSION_COOKIE;
pub use session::{TokenService, TOKEN_ISSUER};

pub use config::*;

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_memory_repository, // ---
    create_noop_metrics,
    create_postgres_repository,
    create_prom_metrics,
    create_redis_repository,
    init_database_with_retry,
    MemoryRepository,
};

/// Build the HTTP router over an already assembled application state.
pub fn build_router(app_state: AppState) -> Router {
    // ---
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/login", get(login_form).post(login))
        .route("/registrar", get(register_form).post(register))
        .route("/logout", get(logout))
        .route("/removeAccount", get(remove_account))
        .route("/favoritos", get(list_favorites))
        .route("/addToFavorites", post(add_to_favorites))
        .route("/removeFromFavorites/{id}", post(remove_from_favorites))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            track_requests,
        ))
        .with_state(app_state)
}

/// Assemble store, metrics and services from `config` and build the router.
///
/// For the Postgres backend this waits for the database and applies migrations.
pub async fn create_app(config: &AppConfig) -> Result<Router> {
    // ---
    let metrics = match config.metrics {
        MetricsKind::Prometheus => create_prom_metrics()?,
        MetricsKind::Noop => create_noop_metrics()?,
    };

    let repository = match &config.store.backend {
        StoreBackend::Postgres(database) => {
            create_postgres_repository(init_database_with_retry(database).await?)
        }
        StoreBackend::Redis { url } => create_redis_repository(url)?,
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; all accounts are lost on restart");
            create_memory_repository()
        }
    };

    let app_state = AppState::new(&config.session, &config.store, repository, metrics);

    Ok(build_router(app_state))
}

/// Build the HTTP router with all configuration taken from environment variables.
pub async fn create_router() -> Result<Router> {
    // ---
    let config = AppConfig::from_env()?;
    create_app(&config).await
}
