//! Redis-backed document store.
//!
//! Each user is a hash at `user:{id}` holding the record's fields, with the
//! favorites list serialized as a JSON array. A `user:name:{name}` key maps a
//! name to its id. Inserts, favorites replacement and deletes run as Lua
//! scripts so each is a single atomic step on the server.

use crate::domain::{InsertOutcome, NewUser, ReplaceOutcome, Repository, RepositoryPtr, User};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, Script};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

const NAME_KEY_PREFIX: &str = "user:name:";

/// Claims the name and writes the document, or returns 0 if the name is taken.
const INSERT_SCRIPT: &str = r#"
if redis.call('SETNX', KEYS[1], ARGV[1]) == 0 then
  return 0
end
redis.call('HSET', KEYS[2],
  'id', ARGV[1], 'name', ARGV[2], 'pass_hash', ARGV[3],
  'favorites', ARGV[4], 'revision', ARGV[5], 'created_at', ARGV[6])
return 1
"#;

/// Returns the new revision, -1 if the document is gone, -2 if the revision moved.
const REPLACE_SCRIPT: &str = r#"
local current = redis.call('HGET', KEYS[1], 'revision')
if not current then
  return -1
end
if current ~= ARGV[1] then
  return -2
end
local next = tonumber(current) + 1
redis.call('HSET', KEYS[1], 'favorites', ARGV[2], 'revision', tostring(next))
return next
"#;

/// Deletes the document and, if it still points here, the name index.
const DELETE_SCRIPT: &str = r#"
local name = redis.call('HGET', KEYS[1], 'name')
if not name then
  return 0
end
redis.call('DEL', KEYS[1])
local name_key = ARGV[1] .. name
if redis.call('GET', name_key) == ARGV[2] then
  redis.call('DEL', name_key)
end
return 1
"#;

pub fn create_redis_repository(url: &str) -> Result<RepositoryPtr> {
    // ---
    let client = Client::open(url)?;
    Ok(Arc::new(RedisRepository::new(client)))
}

pub struct RedisRepository {
    // ---
    client: Client,
    insert_script: Script,
    replace_script: Script,
    delete_script: Script,
}

impl RedisRepository {
    // ---
    pub fn new(client: Client) -> Self {
        // ---
        Self {
            client,
            insert_script: Script::new(INSERT_SCRIPT),
            replace_script: Script::new(REPLACE_SCRIPT),
            delete_script: Script::new(DELETE_SCRIPT),
        }
    }

    async fn get_conn(&self) -> Result<MultiplexedConnection> {
        // ---
        self.client
            .get_multiplexed_async_connection()
            .await
            .context("Failed to connect to Redis")
    }
}

fn user_key(id: Uuid) -> String {
    format!("user:{id}")
}

fn name_key(name: &str) -> String {
    format!("{NAME_KEY_PREFIX}{name}")
}

fn parse_user(mut fields: HashMap<String, String>) -> Result<User> {
    // ---
    let mut take = |field: &str| {
        fields
            .remove(field)
            .ok_or_else(|| anyhow!("user document missing field '{field}'"))
    };

    let id = Uuid::parse_str(&take("id")?)?;
    let name = take("name")?;
    let pass_hash = take("pass_hash")?;
    let favorites: Vec<String> = serde_json::from_str(&take("favorites")?)?;
    let revision = take("revision")?.parse::<i64>()?;
    let created_at = DateTime::parse_from_rfc3339(&take("created_at")?)?.with_timezone(&Utc);

    Ok(User {
        id,
        name,
        pass_hash,
        favorites,
        revision,
        created_at,
    })
}

#[async_trait::async_trait]
impl Repository for RedisRepository {
    // ---
    async fn ping(&self) -> Result<()> {
        // ---
        let mut conn = self.get_conn().await?;
        let _: String = conn.ping().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        // ---
        let mut conn = self.get_conn().await?;
        let fields: HashMap<String, String> = conn.hgetall(user_key(id)).await?;

        if fields.is_empty() {
            return Ok(None);
        }

        parse_user(fields).map(Some)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>> {
        // ---
        let mut conn = self.get_conn().await?;
        let id: Option<String> = conn.get(name_key(name)).await?;

        match id {
            Some(id) => self.find_by_id(Uuid::parse_str(&id)?).await,
            None => Ok(None),
        }
    }

    async fn insert_user(&self, new_user: NewUser) -> Result<InsertOutcome> {
        // ---
        let user = new_user.into_user();
        let mut conn = self.get_conn().await?;

        let inserted: i64 = self
            .insert_script
            .key(name_key(&user.name))
            .key(user_key(user.id))
            .arg(user.id.to_string())
            .arg(&user.name)
            .arg(&user.pass_hash)
            .arg(serde_json::to_string(&user.favorites)?)
            .arg(user.revision)
            .arg(user.created_at.to_rfc3339())
            .invoke_async(&mut conn)
            .await?;

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
        let mut conn = self.get_conn().await?;

        let result: i64 = self
            .replace_script
            .key(user_key(id))
            .arg(expected_revision.to_string())
            .arg(serde_json::to_string(favorites)?)
            .invoke_async(&mut conn)
            .await?;

        Ok(match result {
            -1 => ReplaceOutcome::Missing,
            -2 => ReplaceOutcome::Stale,
            revision => ReplaceOutcome::Committed(revision),
        })
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        // ---
        let mut conn = self.get_conn().await?;

        let deleted: i64 = self
            .delete_script
            .key(user_key(id))
            .arg(NAME_KEY_PREFIX)
            .arg(id.to_string())
            .invoke_async(&mut conn)
            .await?;

        Ok(deleted == 1)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn document(user: &User) -> HashMap<String, String> {
        // ---
        HashMap::from([
            ("id".to_string(), user.id.to_string()),
            ("name".to_string(), user.name.clone()),
            ("pass_hash".to_string(), user.pass_hash.clone()),
            (
                "favorites".to_string(),
                serde_json::to_string(&user.favorites).unwrap(),
            ),
            ("revision".to_string(), user.revision.to_string()),
            ("created_at".to_string(), user.created_at.to_rfc3339()),
        ])
    }

    #[test]
    fn parses_stored_document() {
        // ---
        let mut user = NewUser::new("Dwalin", "hash").into_user();
        user.favorites = vec!["7".to_string(), "7".to_string(), "12".to_string()];
        user.revision = 3;

        let parsed = parse_user(document(&user)).unwrap();
        assert_eq!(parsed, user);
    }

    #[test]
    fn missing_field_is_an_error() {
        // ---
        let user = NewUser::new("Oin", "hash").into_user();
        let mut fields = document(&user);
        fields.remove("revision");

        let err = parse_user(fields).unwrap_err();
        assert!(err.to_string().contains("revision"));
    }

    #[test]
    fn keys_are_namespaced() {
        // ---
        let id = Uuid::nil();
        assert_eq!(user_key(id), "user:00000000-0000-0000-0000-000000000000");
        assert_eq!(name_key("Gloin"), "user:name:Gloin");
    }
}
