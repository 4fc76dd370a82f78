//! Persisted CLI settings.
//!
//! Values are bincode-encoded under dotted keys in a [`SettingsBackend`];
//! [`SettingsProvider`] adds typed accessors for the keys the CLI knows.

mod backend;
mod sqlite;

pub use backend::MemoryBackend;
pub use backend::SettingsBackend;
pub use sqlite::SqliteBackend;

use std::num::NonZeroUsize;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub const API_URL: &str = "api.url";
pub const AUTH_TOKEN: &str = "auth.token";
pub const ITEMS_PER_PAGE: &str = "table.items_per_page";

/// Backend used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Settings error type.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("database error: {0}")]
    Database(#[from] async_sqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(bincode::Error),
    #[error("deserialization error: {0}")]
    Deserialization(bincode::Error),
}

/// Typed settings provider.
#[derive(Clone)]
pub struct SettingsProvider {
    backend: Arc<dyn SettingsBackend>,
}

impl SettingsProvider {
    pub fn new(backend: impl SettingsBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Get a typed value for a key.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SettingsError> {
        match self.backend.get_bytes(key).await? {
            Some(bytes) => Ok(Some(
                bincode::deserialize(&bytes).map_err(SettingsError::Deserialization)?,
            )),
            None => Ok(None),
        }
    }

    /// Set a typed value for a key.
    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), SettingsError> {
        let bytes = bincode::serialize(value).map_err(SettingsError::Serialization)?;
        self.backend.set_bytes(key, bytes).await
    }

    pub async fn delete(&self, key: &str) -> Result<(), SettingsError> {
        self.backend.delete(key).await
    }

    /// Keys with a stored value, sorted.
    pub async fn stored_keys(&self) -> Result<Vec<String>, SettingsError> {
        self.backend.keys().await
    }

    // =========================================================================
    // Known keys
    // =========================================================================

    pub async fn api_url(&self) -> Result<String, SettingsError> {
        Ok(self
            .get(API_URL)
            .await?
            .unwrap_or_else(|| DEFAULT_API_URL.to_string()))
    }

    pub async fn set_api_url(&self, url: &str) -> Result<(), SettingsError> {
        self.set(API_URL, &url.to_string()).await
    }

    pub async fn token(&self) -> Result<Option<String>, SettingsError> {
        self.get(AUTH_TOKEN).await
    }

    pub async fn set_token(&self, token: &str) -> Result<(), SettingsError> {
        self.set(AUTH_TOKEN, &token.to_string()).await
    }

    pub async fn clear_token(&self) -> Result<(), SettingsError> {
        self.delete(AUTH_TOKEN).await
    }

    /// Rows per page; a stored zero falls back to the default.
    pub async fn items_per_page(&self) -> Result<Option<NonZeroUsize>, SettingsError> {
        let stored: Option<u64> = self.get(ITEMS_PER_PAGE).await?;
        Ok(stored
            .and_then(|n| usize::try_from(n).ok())
            .and_then(NonZeroUsize::new))
    }

    pub async fn set_items_per_page(&self, n: NonZeroUsize) -> Result<(), SettingsError> {
        self.set(ITEMS_PER_PAGE, &(n.get() as u64)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> SettingsProvider {
        SettingsProvider::new(MemoryBackend::new())
    }

    #[tokio::test]
    async fn test_api_url_default_and_override() {
        let settings = provider();
        assert_eq!(settings.api_url().await.unwrap(), DEFAULT_API_URL);
        settings.set_api_url("https://shop.example").await.unwrap();
        assert_eq!(settings.api_url().await.unwrap(), "https://shop.example");
    }

    #[tokio::test]
    async fn test_token_lifecycle() {
        let settings = provider();
        assert_eq!(settings.token().await.unwrap(), None);
        settings.set_token("abc").await.unwrap();
        assert_eq!(settings.token().await.unwrap().as_deref(), Some("abc"));
        settings.set_api_url("http://x").await.unwrap();
        assert_eq!(settings.stored_keys().await.unwrap(), vec![API_URL, AUTH_TOKEN]);
        settings.clear_token().await.unwrap();
        assert_eq!(settings.token().await.unwrap(), None);
        assert_eq!(settings.stored_keys().await.unwrap(), vec![API_URL]);
    }

    #[tokio::test]
    async fn test_items_per_page() {
        let settings = provider();
        assert_eq!(settings.items_per_page().await.unwrap(), None);

        settings
            .set_items_per_page(NonZeroUsize::new(25).unwrap())
            .await
            .unwrap();
        assert_eq!(settings.items_per_page().await.unwrap().map(|n| n.get()), Some(25));

        settings.set(ITEMS_PER_PAGE, &0u64).await.unwrap();
        assert_eq!(settings.items_per_page().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_error() {
        let settings = provider();
        settings.set(ITEMS_PER_PAGE, &1u8).await.unwrap();
        assert!(matches!(
            settings.items_per_page().await,
            Err(SettingsError::Deserialization(_))
        ));
    }
}
