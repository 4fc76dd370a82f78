//! Byte-level settings storage.

use async_trait::async_trait;
use dashmap::DashMap;

use super::SettingsError;

/// Backend trait for settings storage.
///
/// Implementations handle raw byte storage/retrieval.
/// The `SettingsProvider` wraps this with typed serialization.
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    /// Get raw bytes for a key.
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, SettingsError>;

    /// Set raw bytes for a key.
    async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), SettingsError>;

    /// Delete a key.
    async fn delete(&self, key: &str) -> Result<(), SettingsError>;

    /// Every stored key, sorted.
    async fn keys(&self) -> Result<Vec<String>, SettingsError>;
}

/// Process-lifetime storage, used when no settings database can be opened.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: DashMap<String, Vec<u8>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsBackend for MemoryBackend {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, SettingsError> {
        Ok(self.values.get(key).map(|value| value.clone()))
    }

    async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SettingsError> {
        self.values.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, SettingsError> {
        let mut keys: Vec<String> = self.values.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }
}
