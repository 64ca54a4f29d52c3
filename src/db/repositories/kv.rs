//! Key-value repository
//!
//! Values are JSON documents stored under fixed keys.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::db::Database;

#[derive(Clone)]
pub struct KvRepository {
    db: Database,
}

impl KvRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Raw value stored under `key`
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let conn = self.db.lock().await;
        conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get::<_, String>(0)
        })
        .optional()
        .context("Failed to read kv entry")
    }

    /// Store a raw value under `key`, replacing any previous one
    pub async fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.db.lock().await;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )
        .context("Failed to write kv entry")?;

        tracing::debug!("Saved kv entry: {}", key);
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        let conn = self.db.lock().await;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Load and decode the value under `key`.
    ///
    /// Missing, unreadable, or undecodable entries all come back as `None`.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.get_raw(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read persisted state {}: {:#}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring corrupt persisted state {}: {}", key, e);
                None
            }
        }
    }

    /// Encode and store `value` under `key`
    pub async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).context("Failed to encode persisted state")?;
        self.set_raw(key, &raw).await
    }
}
