// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Configuration is validated eagerly and failures are treated as
//! deployment errors rather than recoverable runtime conditions.
//! The resulting [`AppConfig`] is immutable and handed to the components
//! that need it; nothing reads the environment after startup.

use anyhow::Result;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads a required environment variable.
///
/// # Behavior
/// - Fails fast if the variable is missing
/// - Produces a clear, human-readable error message
/// - Intended for startup-time configuration validation
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .map_err(|_| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to a missing
/// required environment variable.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Deployment mode. Only affects defaults (domain, port, store backend).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    // ---
    Development,
    Production,
}

impl Environment {
    // ---
    fn from_env() -> Self {
        // ---
        match std::env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_development(self) -> bool {
        // ---
        self == Environment::Development
    }
}

/// Which metrics backend to install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsKind {
    // ---
    Noop,
    Prometheus,
}

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: server::ServerConfig,
    pub session: session::SessionConfig,
    pub store: store::StoreConfig,
    pub metrics: MetricsKind,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any required configuration is missing or invalid.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        let environment = Environment::from_env();

        let metrics = match std::env::var("APP_METRICS_TYPE").as_deref() {
            Ok("prom") => MetricsKind::Prometheus,
            _ => MetricsKind::Noop,
        };

        Ok(Self {
            server: server::ServerConfig::from_env(environment)?,
            session: session::SessionConfig::from_env(environment)?,
            store: store::StoreConfig::from_env(environment)?,
            metrics,
        })
    }
}

// ============================================================
// Server configuration
// ============================================================

mod server {
    // ---
    use super::*;

    /// Listening address and deployment mode.
    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        pub environment: Environment,

        /// Interface to bind. Defaults to 127.0.0.1.
        pub host: String,

        /// Port to bind. Defaults to 3000 in development and 8080 in production.
        pub port: u16,
    }

    impl ServerConfig {
        pub fn from_env(environment: Environment) -> Result<Self> {
            // ---
            let default_port = if environment.is_development() { 3000 } else { 8080 };

            let host = std::env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = optional_env_parse!("APP_PORT", u16, default_port);

            Ok(Self {
                environment,
                host,
                port,
            })
        }

        /// `host:port` suitable for `TcpListener::bind`.
        pub fn bind_addr(&self) -> String {
            // ---
            format!("{}:{}", self.host, self.port)
        }
    }
}
pub use server::ServerConfig;

// ============================================================
// Session configuration
// ============================================================

mod session {
    // ---
    use super::*;

    /// Default session lifetime: 30 days.
    pub const DEFAULT_SESSION_TTL_SECS: u64 = 2_592_000;

    /// Upper bound on the session lifetime: 10 years.
    pub const MAX_SESSION_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

    /// Signing secret and cookie scope for session tokens.
    #[derive(Clone)]
    pub struct SessionConfig {
        /// HMAC secret used to sign tokens. Rotating it invalidates every outstanding session.
        pub secret: String,

        /// Cookie domain.
        pub domain: String,

        /// Token validity window and cookie max-age.
        pub ttl: Duration,
    }

    // The secret must never end up in logs.
    impl std::fmt::Debug for SessionConfig {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("SessionConfig")
                .field("secret", &"<redacted>")
                .field("domain", &self.domain)
                .field("ttl", &self.ttl)
                .finish()
        }
    }

    impl SessionConfig {
        /// Builds a [`SessionConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if the signing secret is missing or empty, or if
        /// the domain is missing outside development.
        pub fn from_env(environment: Environment) -> Result<Self> {
            // ---
            let secret = required_env!("JWT_PRIVATE_KEY");
            if secret.trim().is_empty() {
                anyhow::bail!("JWT_PRIVATE_KEY must not be empty");
            }

            let domain = if environment.is_development() {
                std::env::var("APP_DOMAIN").unwrap_or_else(|_| "localhost".to_string())
            } else {
                required_env!("APP_DOMAIN")
            };

            let ttl_secs = optional_env_parse!("SESSION_TTL_SECS", u64, DEFAULT_SESSION_TTL_SECS);
            if ttl_secs == 0 || ttl_secs > MAX_SESSION_TTL_SECS {
                anyhow::bail!(
                    "SESSION_TTL_SECS must be between 1 and {MAX_SESSION_TTL_SECS}, got {ttl_secs}"
                );
            }

            Ok(Self {
                secret,
                domain,
                ttl: Duration::from_secs(ttl_secs),
            })
        }

        /// Session lifetime in whole seconds, capped at [`MAX_SESSION_TTL_SECS`]
        /// for configs built by hand rather than through `from_env`.
        pub fn ttl_secs(&self) -> i64 {
            // ---
            i64::try_from(self.ttl.as_secs().min(MAX_SESSION_TTL_SECS)).unwrap_or(i64::MAX)
        }
    }
}
pub use session::{SessionConfig, DEFAULT_SESSION_TTL_SECS, MAX_SESSION_TTL_SECS};

// ============================================================
// Store configuration
// ============================================================

mod store {
    // ---
    use super::*;

    /// PostgreSQL connection settings.
    #[derive(Debug, Clone)]
    pub struct DatabaseConfig {
        /// PostgreSQL connection string.
        pub database_url: String,

        /// Number of retry attempts when initializing the database connection. Defaults to 50.
        pub retry_count: u32,

        /// Maximum time to wait when acquiring a connection from the pool. Defaults to 30 seconds.
        pub acquire_timeout: Duration,

        /// Minimum number of connections to keep in the pool, even when idle. Defaults to 2.
        pub min_connections: u32,

        /// Maximum number of connections to be open concurrently. Defaults to 15.
        pub max_connections: u32,
    }

    impl DatabaseConfig {
        pub fn from_env() -> Result<Self> {
            // ---
            let database_url = required_env!("DATABASE_URL");
            let retry_count = optional_env_parse!("APP_DB_RETRY_COUNT", u32, 50);
            let acquire_timeout_secs = optional_env_parse!("APP_DB_ACQUIRE_TIMEOUT_SEC", u64, 30);
            let min_connections = optional_env_parse!("APP_DB_MIN_CONNECTIONS", u32, 2);
            let max_connections = optional_env_parse!("APP_DB_MAX_CONNECTIONS", u32, 15);

            Ok(Self {
                database_url,
                retry_count,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
                min_connections,
                max_connections,
            })
        }
    }

    /// Which document store backs the user collection.
    #[derive(Debug, Clone)]
    pub enum StoreBackend {
        Postgres(DatabaseConfig),
        Redis { url: String },
        Memory,
    }

    /// Store selection plus the call discipline applied to every store round trip.
    #[derive(Debug, Clone)]
    pub struct StoreConfig {
        pub backend: StoreBackend,

        /// Upper bound on a single store call before it fails as transient. Defaults to 5s.
        pub timeout: Duration,

        /// Extra attempts for idempotent reads after a transient failure. Defaults to 2.
        pub read_retries: u32,

        /// Compare-and-swap attempts for one favorites mutation. Defaults to 16.
        pub cas_retries: u32,
    }

    impl StoreConfig {
        /// Builds a [`StoreConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error for an unknown backend name, or when the selected
        /// backend's connection string is missing.
        pub fn from_env(environment: Environment) -> Result<Self> {
            // ---
            let default_backend = if environment.is_development() {
                "memory"
            } else {
                "postgres"
            };
            let backend_name =
                std::env::var("APP_STORE_TYPE").unwrap_or_else(|_| default_backend.to_string());

            let backend = match backend_name.as_str() {
                "postgres" => StoreBackend::Postgres(DatabaseConfig::from_env()?),
                "redis" => StoreBackend::Redis {
                    url: required_env!("APP_REDIS_URL"),
                },
                "memory" => StoreBackend::Memory,
                other => anyhow::bail!("Unsupported APP_STORE_TYPE: {other}"),
            };

            let timeout_ms = optional_env_parse!("APP_STORE_TIMEOUT_MS", u64, 5_000);
            let read_retries = optional_env_parse!("APP_STORE_READ_RETRIES", u32, 2);
            let cas_retries = optional_env_parse!("APP_FAVORITES_CAS_RETRIES", u32, 16);

            Ok(Self {
                backend,
                timeout: Duration::from_millis(timeout_ms),
                read_retries,
                cas_retries: cas_retries.max(1),
            })
        }

        /// In-memory store with default call discipline. Used by tests and local runs.
        pub fn memory() -> Self {
            // ---
            Self {
                backend: StoreBackend::Memory,
                timeout: Duration::from_secs(5),
                read_retries: 2,
                cas_retries: 16,
            }
        }
    }
}
pub use store::{DatabaseConfig, StoreBackend, StoreConfig};

// ============================================================
// Tests
// ============================================================
