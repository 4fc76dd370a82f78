//! SQLite settings store fronted by a read cache.

use std::path::Path;

use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_trait::async_trait;
use dashmap::DashMap;
use rusqlite::OptionalExtension;

use super::SettingsBackend;
use super::SettingsError;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cli_settings (
    key        TEXT PRIMARY KEY,
    value      BLOB NOT NULL,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)";

/// One row per setting in `settings.db`.
///
/// Reads are served from the cache once a key has been seen; writes go to the
/// database first and only then update the cache.
pub struct SqliteBackend {
    client: Client,
    cache: DashMap<String, Vec<u8>>,
}

impl SqliteBackend {
    /// Opens (or creates) the settings database at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let client = ClientBuilder::new().path(path).open().await?;
        client.conn(|conn| conn.execute_batch(SCHEMA)).await?;
        Ok(Self {
            client,
            cache: DashMap::new(),
        })
    }
}

#[async_trait]
impl SettingsBackend for SqliteBackend {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, SettingsError> {
        if let Some(hit) = self.cache.get(key) {
            return Ok(Some(hit.clone()));
        }

        let lookup = key.to_string();
        let stored: Option<Vec<u8>> = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT value FROM cli_settings WHERE key = ?1",
                    [&lookup],
                    |row| row.get(0),
                )
                .optional()
            })
            .await?;

        if let Some(value) = &stored {
            self.cache.insert(key.to_string(), value.clone());
        }
        Ok(stored)
    }

    async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), SettingsError> {
        let row = (key.to_string(), value.clone());
        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT INTO cli_settings (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE
                     SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
                    rusqlite::params![row.0, row.1],
                )
            })
            .await?;
        self.cache.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SettingsError> {
        let target = key.to_string();
        self.client
            .conn(move |conn| conn.execute("DELETE FROM cli_settings WHERE key = ?1", [&target]))
            .await?;
        self.cache.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, SettingsError> {
        let keys = self
            .client
            .conn(|conn| {
                let mut stmt = conn.prepare("SELECT key FROM cli_settings ORDER BY key")?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect::<Result<Vec<String>, _>>()
            })
            .await?;
        Ok(keys)
    }
}
