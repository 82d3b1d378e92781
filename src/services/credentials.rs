//! User records: name uniqueness, password hashing and verification, deletion.

use super::store_call::StoreCall;
use crate::domain::{InsertOutcome, NewUser, RepositoryPtr, ServiceError, User};

/// bcrypt work factor for every stored password hash.
pub const BCRYPT_COST: u32 = 12;

/// Owns user records in the document store.
#[derive(Clone)]
pub struct CredentialStore {
    // ---
    repository: RepositoryPtr,
    calls: StoreCall,
}

impl CredentialStore {
    // ---
    pub fn new(repository: RepositoryPtr, calls: StoreCall) -> Self {
        // ---
        Self { repository, calls }
    }

    /// Looks a user up by their unique name.
    pub async fn find_by_name(&self, name: &str) -> Result<User, ServiceError> {
        // ---
        let repository = &self.repository;
        self.calls
            .read("find_by_name", move || repository.find_by_name(name))
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// Registers a new user with an empty favorites list.
    ///
    /// The up-front lookup rejects the common duplicate case before paying for
    /// a bcrypt hash. The insert itself is an atomic compare-and-insert in the
    /// store, so two racing registrations for one name cannot both succeed.
    #[tracing::instrument(skip(self, password))]
    pub async fn register(&self, name: &str, password: &str) -> Result<User, ServiceError> {
        // ---
        match self.find_by_name(name).await {
            Ok(_) => {
                tracing::info!("Registration rejected, name already taken: {}", name);
                return Err(ServiceError::Conflict);
            }
            Err(ServiceError::NotFound) => {}
            Err(err) => return Err(err),
        }

        let pass_hash = hash_password(password).await?;

        let outcome = self
            .calls
            .once(
                "insert_user",
                self.repository.insert_user(NewUser::new(name, pass_hash)),
            )
            .await?;

        match outcome {
            InsertOutcome::Inserted(user) => {
                tracing::info!("Registered user: {}", user.name);
                Ok(user)
            }
            InsertOutcome::NameTaken => {
                tracing::warn!("Lost registration race for name: {}", name);
                Err(ServiceError::Conflict)
            }
        }
    }

    /// Checks `password` against the user's stored hash.
    ///
    /// bcrypt compares digests in constant time. A hash that cannot be parsed
    /// counts as a mismatch.
    pub async fn verify_password(&self, user: &User, password: &str) -> bool {
        // ---
        let pass_hash = user.pass_hash.clone();
        let password = password.to_string();

        match tokio::task::spawn_blocking(move || bcrypt::verify(password, &pass_hash)).await {
            Ok(Ok(matches)) => matches,
            Ok(Err(err)) => {
                tracing::warn!("Stored hash for '{}' is unusable: {:?}", user.name, err);
                false
            }
            Err(err) => {
                tracing::error!("Password verification task failed: {:?}", err);
                false
            }
        }
    }

    /// Resolves credentials to a user: `NotFound` for an unknown name,
    /// `Unauthorized` for a wrong password.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, name: &str, password: &str) -> Result<User, ServiceError> {
        // ---
        let user = self.find_by_name(name).await?;

        if self.verify_password(&user, password).await {
            Ok(user)
        } else {
            tracing::info!("Incorrect password for user: {}", name);
            Err(ServiceError::Unauthorized)
        }
    }

    /// Hard-deletes the user. Deleting an already-missing record is not an error.
    pub async fn delete_user(&self, user: &User) -> Result<(), ServiceError> {
        // ---
        let existed = self
            .calls
            .once("delete_user", self.repository.delete_user(user.id))
            .await?;

        if existed {
            tracing::info!("Deleted user: {}", user.name);
        } else {
            tracing::debug!("User already deleted: {}", user.name);
        }

        Ok(())
    }
}

/// Salted bcrypt hash at [`BCRYPT_COST`], computed off the async workers.
async fn hash_password(password: &str) -> Result<String, ServiceError> {
    // ---
    let password = password.to_string();

    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| ServiceError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| ServiceError::Internal(format!("password hashing failed: {e}")))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::infrastructure::create_memory_repository;
    use std::time::Duration;

    fn store() -> CredentialStore {
        // ---
        CredentialStore::new(
            create_memory_repository(),
            StoreCall::new(Duration::from_secs(5), 0),
        )
    }

    #[tokio::test]
    async fn register_then_login() {
        // ---
        let store = store();

        let user = store.register("alice", "secret123").await.unwrap();
        assert_eq!(user.name, "alice");
        assert!(user.favorites.is_empty());
        assert!(user.pass_hash.starts_with("$2"));
        assert!(user.pass_hash.contains("$12$"));
        assert_ne!(user.pass_hash, "secret123");

        let logged_in = store.login("alice", "secret123").await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn login_distinguishes_unknown_user_and_wrong_password() {
        // ---
        let store = store();
        store.register("alice", "secret123").await.unwrap();

        assert_eq!(
            store.login("bob", "secret123").await,
            Err(ServiceError::NotFound)
        );
        assert_eq!(
            store.login("alice", "wrong").await,
            Err(ServiceError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn names_are_case_sensitive() {
        // ---
        let store = store();
        store.register("alice", "secret123").await.unwrap();

        assert_eq!(store.find_by_name("Alice").await, Err(ServiceError::NotFound));
        assert!(store.register("Alice", "other-pass").await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        // ---
        let store = store();
        store.register("alice", "secret123").await.unwrap();

        assert_eq!(
            store.register("alice", "another").await,
            Err(ServiceError::Conflict)
        );
        // The original password still works; the record was not replaced.
        assert!(store.login("alice", "secret123").await.is_ok());
    }

    #[tokio::test]
    async fn concurrent_registrations_admit_one() {
        // ---
        let store = store();

        let attempts = (0..4).map(|i| {
            let store = store.clone();
            async move { store.register("carol", &format!("pass-{i}")).await }
        });
        let results = futures::future::join_all(attempts).await;

        let created = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(ServiceError::Conflict)))
            .count();
        assert_eq!(created, 1);
        assert_eq!(conflicts, 3);
    }

    #[tokio::test]
    async fn malformed_hash_never_verifies() {
        // ---
        let store = store();
        let mut user = NewUser::new("mallory", "not-a-bcrypt-hash").into_user();

        assert!(!store.verify_password(&user, "anything").await);

        user.pass_hash = String::new();
        assert!(!store.verify_password(&user, "").await);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        // ---
        let store = store();
        let user = store.register("dave", "secret123").await.unwrap();

        store.delete_user(&user).await.unwrap();
        assert_eq!(store.find_by_name("dave").await, Err(ServiceError::NotFound));

        // Second delete finds nothing and still succeeds.
        store.delete_user(&user).await.unwrap();
    }
}
