use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::domain::{InsertOutcome, NewUser, ReplaceOutcome, Repository, RepositoryPtr, User};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    pass_hash: String,
    favorites: Vec<String>,
    revision: i64,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        // ---
        User {
            id: r.id,
            name: r.name,
            pass_hash: r.pass_hash,
            favorites: r.favorites,
            revision: r.revision,
            created_at: r.created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, name, pass_hash, favorites, revision, created_at";

/// Connects to PostgreSQL, retrying while the server comes up, and applies
/// the embedded migrations.
pub async fn init_database_with_retry(config: &DatabaseConfig) -> Result<PgPool> {
    // ---
    let mut attempt = 0;
    let pool = loop {
        attempt += 1;

        let result = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await;

        match result {
            Ok(pool) => break pool,
            Err(err) if attempt < config.retry_count => {
                tracing::warn!("Database not ready (attempt {}): {}", attempt, err);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(err) => return Err(err.into()),
        }
    };

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database ready after {} attempt(s)", attempt);

    Ok(pool)
}

pub fn create_postgres_repository(pool: PgPool) -> RepositoryPtr {
    // ---
    Arc::new(PostgresRepository::new(pool))
}

pub struct PostgresRepository {
    // ---
    pool: PgPool,
}

impl PostgresRepository {
    // ---
    pub fn new(pool: PgPool) -> Self {
        // ---
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Repository for PostgresRepository {
    // ---
    async fn ping(&self) -> Result<()> {
        // ---
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        // ---
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>> {
        // ---
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE name = $1 ORDER BY created_at LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn insert_user(&self, new_user: NewUser) -> Result<InsertOutcome> {
        // ---
        let user = new_user.into_user();

        // The UNIQUE(name) constraint turns a lost race into zero inserted rows.
        let inserted = sqlx::query(
            "INSERT INTO users (id, name, pass_hash, favorites, revision, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.pass_hash)
        .bind(&user.favorites)
        .bind(user.revision)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted == 0 {
            Ok(InsertOutcome::NameTaken)
        } else {
            Ok(InsertOutcome::Inserted(user))
        }
    }

    async fn replace_favorites(
        &self,
        id: Uuid,
        expected_revision: i64,
        favorites: &[String],
    ) -> Result<ReplaceOutcome> {
        // ---
        let revision: Option<i64> = sqlx::query_scalar(
            "UPDATE users SET favorites = $1, revision = revision + 1
             WHERE id = $2 AND revision = $3
             RETURNING revision",
        )
        .bind(favorites)
        .bind(id)
        .bind(expected_revision)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(revision) = revision {
            return Ok(ReplaceOutcome::Committed(revision));
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(if exists {
            ReplaceOutcome::Stale
        } else {
            ReplaceOutcome::Missing
        })
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        // ---
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}
