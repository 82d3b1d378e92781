mod postgres_repository;

pub use postgres_repository::{create_postgres_repository, init_database_with_retry};
