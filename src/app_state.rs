//! Application state management.
//!
//! This module defines the shared state structure that gets passed to all
//! Axum handlers via the `State` extractor. It holds the core services
//! (credentials, favorites, request authentication), the session token
//! service and the metrics implementation.
//!
//! Everything inside is either `Arc`-wrapped or cheap to clone, so Axum can
//! clone the state per request.

use crate::config::{SessionConfig, StoreConfig};
use crate::domain::{MetricsPtr, RepositoryPtr};
use crate::services::{CredentialStore, FavoritesManager, RequestAuthenticator, StoreCall};
use crate::session::TokenService;
use std::sync::Arc;

/// Shared application state passed to all Axum handlers.
///
/// Built once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Metrics implementation for recording application events.
    metrics: MetricsPtr,

    /// Document store holding user records. Only used directly by health checks;
    /// everything else goes through the services below.
    repository: RepositoryPtr,

    /// Timeout and retry policy shared by every store call.
    store_calls: StoreCall,

    /// Issues and verifies session tokens.
    tokens: Arc<TokenService>,

    /// Cookie scope and lifetime.
    session: Arc<SessionConfig>,

    credentials: CredentialStore,
    favorites: FavoritesManager,
    authenticator: RequestAuthenticator,
}

impl AppState {
    // ---

    pub fn new(
        session: &SessionConfig,
        store: &StoreConfig,
        repository: RepositoryPtr,
        metrics: MetricsPtr,
    ) -> Self {
        // ---
        let calls = StoreCall::from_config(store);
        let tokens = Arc::new(TokenService::new(session));
        let credentials = CredentialStore::new(repository.clone(), calls);
        let favorites = FavoritesManager::new(repository.clone(), calls, store.cas_retries);
        let authenticator = RequestAuthenticator::new(tokens.clone(), credentials.clone());

        AppState {
            metrics,
            repository,
            store_calls: calls,
            tokens,
            session: Arc::new(session.clone()),
            credentials,
            favorites,
            authenticator,
        }
    }

    /// Get a reference to the metrics implementation.
    pub(crate) fn metrics(&self) -> &MetricsPtr {
        // ---
        &self.metrics
    }

    /// Get a reference to the repository implementation.
    pub(crate) fn repository(&self) -> &RepositoryPtr {
        // ---
        &self.repository
    }

    pub(crate) fn store_calls(&self) -> &StoreCall {
        // ---
        &self.store_calls
    }

    pub(crate) fn tokens(&self) -> &TokenService {
        // ---
        &self.tokens
    }

    pub(crate) fn session(&self) -> &SessionConfig {
        // ---
        &self.session
    }

    pub(crate) fn credentials(&self) -> &CredentialStore {
        // ---
        &self.credentials
    }

    pub(crate) fn favorites(&self) -> &FavoritesManager {
        // ---
        &self.favorites
    }

    pub(crate) fn authenticator(&self) -> &RequestAuthenticator {
        // ---
        &self.authenticator
    }
}
