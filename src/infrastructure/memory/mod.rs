//! In-process document store.
//!
//! Records live in insertion order behind one lock, so the name check and the
//! insert, as well as the revision check and the favorites write, are each a
//! single atomic step. Used for development runs and tests.

use crate::domain::{InsertOutcome, NewUser, ReplaceOutcome, Repository, RepositoryPtr, User};
use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

pub fn create_memory_repository() -> RepositoryPtr {
    // ---
    Arc::new(MemoryRepository::new())
}

#[derive(Default)]
pub struct MemoryRepository {
    // ---
    users: Mutex<Vec<User>>,
}

impl MemoryRepository {
    // ---
    pub fn new() -> Self {
        // ---
        Self::default()
    }

    fn users(&self) -> Result<MutexGuard<'_, Vec<User>>> {
        // ---
        self.users
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

#[async_trait::async_trait]
impl Repository for MemoryRepository {
    // ---
    async fn ping(&self) -> Result<()> {
        // ---
        self.users().map(|_| ())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        // ---
        Ok(self.users()?.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>> {
        // ---
        Ok(self.users()?.iter().find(|u| u.name == name).cloned())
    }

    async fn insert_user(&self, new_user: NewUser) -> Result<InsertOutcome> {
        // ---
        let mut users = self.users()?;

        if users.iter().any(|u| u.name == new_user.name) {
            return Ok(InsertOutcome::NameTaken);
        }

        let user = new_user.into_user();
        users.push(user.clone());
        Ok(InsertOutcome::Inserted(user))
    }

    async fn replace_favorites(
        &self,
        id: Uuid,
        expected_revision: i64,
        favorites: &[String],
    ) -> Result<ReplaceOutcome> {
        // ---
        let mut users = self.users()?;

        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(ReplaceOutcome::Missing);
        };

        if user.revision != expected_revision {
            return Ok(ReplaceOutcome::Stale);
        }

        user.favorites = favorites.to_vec();
        user.revision += 1;
        Ok(ReplaceOutcome::Committed(user.revision))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        // ---
        let mut users = self.users()?;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }
}
