//! Persistent token storage.
//!
//! This module provides the storage trait the session client reads tokens
//! from, plus two implementations: an in-memory map and a JSON file on disk.
//! The client keeps no token cache of its own, so anything written here by
//! another code path is seen by the very next request.

use crate::error::StoreError;
use async_trait::async_trait;
use estate_core::{TokenPair, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TOKEN_KEYS};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Key/value storage for session tokens.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read a value.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove several keys at once. Missing keys are ignored.
    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError>;

    /// Read the access token.
    async fn access_token(&self) -> Result<Option<String>, StoreError> {
        self.get(ACCESS_TOKEN_KEY).await
    }

    /// Read the refresh token.
    async fn refresh_token(&self) -> Result<Option<String>, StoreError> {
        self.get(REFRESH_TOKEN_KEY).await
    }

    /// Persist a token pair.
    ///
    /// A pair without a refresh token leaves the stored refresh token alone.
    async fn save_pair(&self, pair: &TokenPair) -> Result<(), StoreError> {
        self.set(ACCESS_TOKEN_KEY, &pair.access).await?;
        if let Some(ref refresh) = pair.refresh {
            self.set(REFRESH_TOKEN_KEY, refresh).await?;
        }
        Ok(())
    }

    /// Delete both tokens.
    async fn clear(&self) -> Result<(), StoreError> {
        self.remove(&TOKEN_KEYS).await
    }
}

/// In-memory token store.
///
/// Suitable for tests and short-lived tools. Tokens are lost when the process
/// exits.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `pair`.
    pub fn with_pair(pair: &TokenPair) -> Self {
        let store = Self::new();
        {
            let mut values = store.values.write();
            values.insert(ACCESS_TOKEN_KEY.to_string(), pair.access.clone());
            if let Some(ref refresh) = pair.refresh {
                values.insert(REFRESH_TOKEN_KEY.to_string(), refresh.clone());
            }
        }
        store
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut values = self.values.write();
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }
}

/// File-backed token store.
///
/// Tokens live in a single JSON object. Writes go to a sibling temp file that
/// is then renamed over the original, so a crash never leaves half a file.
/// On unix the file is readable by its owner only (`0o600`).
/// A missing file reads as an empty store.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    /// Create a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(values)?;
        let tmp = self
            .path
            .with_extension(format!("tmp-{}", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, content).await?;
        if let Err(e) = restrict_to_owner(&tmp).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

/// Make `path` readable and writable by its owner only.
#[cfg(unix)]
async fn restrict_to_owner(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
async fn restrict_to_owner(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.load().await?;
        values.insert(key.to_string(), value.to_string());
        self.persist(&values).await
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.load().await?;
        let before = values.len();
        for key in keys {
            values.remove(*key);
        }
        if values.len() == before {
            return Ok(());
        }
        self.persist(&values).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("estate_store_test_{}", uuid::Uuid::new_v4().simple()))
            .join("session.json")
    }

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let store = InMemoryTokenStore::new();
        assert!(store.access_token().await.unwrap().is_none());

        store.save_pair(&TokenPair::new("a1", "r1")).await.unwrap();
        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("a1"));
        assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("r1"));

        store.clear().await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_save_access_only_keeps_refresh() {
        let store = InMemoryTokenStore::with_pair(&TokenPair::new("a1", "r1"));
        store
            .save_pair(&TokenPair::access_only("a2"))
            .await
            .unwrap();

        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("a2"));
        assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let store = FileTokenStore::new(temp_path());
        assert!(store.access_token().await.unwrap().is_none());
        store.clear().await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let path = temp_path();

        let store = FileTokenStore::new(&path);
        store.save_pair(&TokenPair::new("a1", "r1")).await.unwrap();

        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.access_token().await.unwrap().as_deref(), Some("a1"));
        assert_eq!(reopened.refresh_token().await.unwrap().as_deref(), Some("r1"));

        reopened.clear().await.unwrap();
        assert!(store.access_token().await.unwrap().is_none());
        assert!(store.refresh_token().await.unwrap().is_none());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let store = FileTokenStore::new(&path);
        assert!(matches!(
            store.access_token().await,
            Err(StoreError::Corrupt(_))
        ));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path();
        let store = FileTokenStore::new(&path);
        store.save_pair(&TokenPair::new("a1", "r1")).await.unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        store.set(ACCESS_TOKEN_KEY, "a2").await.unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
