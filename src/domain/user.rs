use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A registered account together with its favorites list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    // ---
    /// Store-assigned identifier, stable for the record's lifetime.
    pub id: Uuid,

    /// Case-sensitive login name, unique across all users.
    pub name: String,

    /// bcrypt hash of the password. Never serialized to clients.
    #[serde(skip_serializing)]
    pub pass_hash: String,

    /// Favorite item identifiers in insertion order. Duplicates are allowed.
    pub favorites: Vec<String>,

    /// Bumped by the store on every favorites write; used as a compare-and-swap token.
    pub revision: i64,

    pub created_at: DateTime<Utc>,
}

/// The fields a caller supplies when registering; the store assigns the rest.
#[derive(Debug, Clone)]
pub struct NewUser {
    // ---
    pub name: String,
    pub pass_hash: String,
}

impl NewUser {
    // ---
    pub fn new(name: impl Into<String>, pass_hash: impl Into<String>) -> Self {
        // ---
        Self {
            name: name.into(),
            pass_hash: pass_hash.into(),
        }
    }

    /// Materializes the record with a fresh id, empty favorites and revision zero.
    pub fn into_user(self) -> User {
        // ---
        User {
            id: Uuid::new_v4(),
            name: self.name,
            pass_hash: self.pass_hash,
            favorites: Vec::new(),
            revision: 0,
            created_at: Utc::now(),
        }
    }
}
