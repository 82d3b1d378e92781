//! Per-user favorites list mutations.
//!
//! The store can only replace the whole `favorites` field, so every mutation
//! is a read-modify-write. Within this process, mutations for one user queue
//! on a per-user lock held across the whole read-modify-write. Each write is
//! also guarded by the record's revision, which catches writers in other
//! processes sharing the store: a stale write is refused and the mutation is
//! replayed against a fresh read.

use super::store_call::StoreCall;
use crate::domain::{ReplaceOutcome, RepositoryPtr, ServiceError, User};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use uuid::Uuid;

type UserLock = tokio::sync::Mutex<()>;

/// One async lock per user with a mutation in flight.
///
/// The map only holds weak references; a lock is dropped with its last
/// holder or waiter, and dead entries are pruned on insert.
#[derive(Default)]
struct UserLocks {
    // ---
    locks: Mutex<HashMap<Uuid, Weak<UserLock>>>,
}

impl UserLocks {
    // ---
    fn lock_for(&self, id: Uuid) -> Arc<UserLock> {
        // ---
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(lock) = locks.get(&id).and_then(Weak::upgrade) {
            return lock;
        }

        locks.retain(|_, lock| lock.strong_count() > 0);
        let lock = Arc::new(UserLock::new(()));
        locks.insert(id, Arc::downgrade(&lock));
        lock
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|lock| lock.strong_count() > 0)
            .count()
    }
}

/// Serializes favorites mutations per user: an in-process lock keyed by user
/// id, plus compare-and-swap on the revision against other processes.
#[derive(Clone)]
pub struct FavoritesManager {
    // ---
    repository: RepositoryPtr,
    calls: StoreCall,
    cas_retries: u32,
    locks: Arc<UserLocks>,
}

impl FavoritesManager {
    // ---
    pub fn new(repository: RepositoryPtr, calls: StoreCall, cas_retries: u32) -> Self {
        // ---
        Self {
            repository,
            calls,
            cas_retries: cas_retries.max(1),
            locks: Arc::new(UserLocks::default()),
        }
    }

    /// Current favorites in stored order, read fresh from the store.
    pub async fn list(&self, user: &User) -> Result<Vec<String>, ServiceError> {
        // ---
        Ok(self.current(user).await?.favorites)
    }

    /// Appends `item` to the end of the user's favorites.
    #[tracing::instrument(skip(self, user), fields(user = %user.name))]
    pub async fn add(&self, user: &User, item: &str) -> Result<Vec<String>, ServiceError> {
        // ---
        self.mutate(user, "add", |favorites| {
            favorites.push(item.to_string());
            Ok(())
        })
        .await
    }

    /// Removes the element at 0-based `index`; later elements shift down by one.
    ///
    /// Fails with `OutOfRange` without writing anything if `index` is negative
    /// or not below the current length.
    #[tracing::instrument(skip(self, user), fields(user = %user.name))]
    pub async fn remove(&self, user: &User, index: i64) -> Result<Vec<String>, ServiceError> {
        // ---
        self.mutate(user, "remove", |favorites| {
            let len = favorites.len();
            let position = usize::try_from(index)
                .ok()
                .filter(|position| *position < len)
                .ok_or(ServiceError::OutOfRange { index, len })?;

            favorites.remove(position);
            Ok(())
        })
        .await
    }

    async fn current(&self, user: &User) -> Result<User, ServiceError> {
        // ---
        let repository = &self.repository;
        let id = user.id;

        self.calls
            .read("find_by_id", move || repository.find_by_id(id))
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// Read-modify-write loop. `apply` runs against a fresh copy on every attempt,
    /// never against the possibly stale `user` handed in by the caller.
    async fn mutate<F>(
        &self,
        user: &User,
        op: &'static str,
        mut apply: F,
    ) -> Result<Vec<String>, ServiceError>
    where
        F: FnMut(&mut Vec<String>) -> Result<(), ServiceError>,
    {
        // ---
        let lock = self.locks.lock_for(user.id);
        let _serialized = lock.lock().await;

        // Only writers outside this process can make an attempt stale now.
        for attempt in 1..=self.cas_retries {
            let current = self.current(user).await?;
            let mut favorites = current.favorites;
            apply(&mut favorites)?;

            let outcome = self
                .calls
                .once(
                    "replace_favorites",
                    self.repository
                        .replace_favorites(user.id, current.revision, &favorites),
                )
                .await?;

            match outcome {
                ReplaceOutcome::Committed(revision) => {
                    tracing::debug!("Favorites {} committed at revision {}", op, revision);
                    return Ok(favorites);
                }
                ReplaceOutcome::Stale => {
                    tracing::debug!(
                        "Favorites {} hit a concurrent write (attempt {}), retrying",
                        op,
                        attempt
                    );
                    tokio::time::sleep(Duration::from_millis(u64::from(attempt))).await;
                }
                ReplaceOutcome::Missing => return Err(ServiceError::NotFound),
            }
        }

        tracing::warn!(
            "Favorites {} for '{}' gave up after {} attempts conflicting with other writers",
            op,
            user.name,
            self.cas_retries
        );
        Err(ServiceError::Transient(format!(
            "favorites {op} kept conflicting with concurrent writers"
        )))
    }
}
