use super::user::{NewUser, User};
use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

/// Result of an atomic compare-and-insert on the unique `name` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    // ---
    Inserted(User),
    NameTaken,
}

/// Result of a revision-guarded replacement of the favorites field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    // ---
    /// The write landed; carries the record's new revision.
    Committed(i64),

    /// Another writer bumped the revision since it was read.
    Stale,

    /// The record no longer exists.
    Missing,
}

/// Abstraction over the document store holding user records.
///
/// The store offers point lookup, lookup by the `name` field and whole-field
/// replacement. There is no sub-field append/remove primitive; callers mutate
/// `favorites` by reading the whole list and writing it back under a revision
/// check.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    // ---
    /// Cheap liveness probe used by the full health check.
    async fn ping(&self) -> Result<()>;

    /// Get user by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Get user by name. If several records share a name the first one the
    /// store returns wins; callers must not rely on which.
    async fn find_by_name(&self, name: &str) -> Result<Option<User>>;

    /// Insert a new user unless the name is already taken, as one atomic step.
    async fn insert_user(&self, new_user: NewUser) -> Result<InsertOutcome>;

    /// Replace the whole favorites list if the stored revision still equals
    /// `expected_revision`.
    async fn replace_favorites(
        &self,
        id: Uuid,
        expected_revision: i64,
        favorites: &[String],
    ) -> Result<ReplaceOutcome>;

    /// Hard-delete a user. Returns `false` if there was nothing to delete.
    async fn delete_user(&self, id: Uuid) -> Result<bool>;
}

/// Type alias for any backend that implements Repository.
pub type RepositoryPtr = Arc<dyn Repository>;
