mod error;
mod metrics;
mod repository;
mod user;

// Publicly expose the Metrics abstraction
pub use metrics::{Metrics, MetricsPtr};

// Publicly expose the document store abstraction
pub use repository::{InsertOutcome, ReplaceOutcome, Repository, RepositoryPtr};

pub use error::ServiceError;
pub use user::{NewUser, User};
