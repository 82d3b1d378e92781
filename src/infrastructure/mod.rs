mod database;
mod memory;
pub mod metrics;
mod redis_store;

// Re-export the factory functions for easy access
pub use database::{create_postgres_repository, init_database_with_retry};
pub use memory::{create_memory_repository, MemoryRepository};
pub use metrics::{create_noop_metrics, create_prom_metrics};
pub use redis_store::create_redis_repository;
