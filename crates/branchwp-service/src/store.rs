//! Configuration store implementation
//!
//! This module provides the store abstraction the permission service reads
//! and writes repository configurations through, and an in-memory backend.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::permissions::BranchWritePermissions;

/// Configuration store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend cannot be reached or refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Per-repository configuration store.
///
/// The host decides where configuration lives; every backend is keyed by
/// repository id.
#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    /// Get the configuration of a repository, if one was stored.
    async fn get(&self, repository: &str) -> StoreResult<Option<BranchWritePermissions>>;

    /// Store the configuration of a repository, replacing any previous one.
    async fn set(&self, repository: &str, permissions: BranchWritePermissions) -> StoreResult<()>;

    /// Get the ids of all repositories with a stored configuration.
    async fn repositories(&self) -> StoreResult<Vec<String>>;
}

/// In-memory configuration store.
///
/// This is suitable for single-process deployments and testing.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigurationStore {
    /// Configurations by repository id
    entries: Arc<RwLock<HashMap<String, BranchWritePermissions>>>,
}

impl MemoryConfigurationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored configurations.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ConfigurationStore for MemoryConfigurationStore {
    async fn get(&self, repository: &str) -> StoreResult<Option<BranchWritePermissions>> {
        Ok(self.entries.read().await.get(repository).cloned())
    }

    async fn set(&self, repository: &str, permissions: BranchWritePermissions) -> StoreResult<()> {
        self.entries
            .write()
            .await
            .insert(repository.to_string(), permissions);
        Ok(())
    }

    async fn repositories(&self) -> StoreResult<Vec<String>> {
        let mut ids: Vec<String> = self.entries.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchwp_rules::Rule;

    #[tokio::test]
    async fn test_get_missing() {
        let store = MemoryConfigurationStore::new();
        assert!(store.get("repo-1").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryConfigurationStore::new();
        let mut config = BranchWritePermissions::default();
        config.permissions.push(Rule::allow_user("main", "trillian"));

        store.set("repo-1", config.clone()).await.unwrap();
        assert_eq!(store.get("repo-1").await.unwrap(), Some(config));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_set_replaces() {
        let store = MemoryConfigurationStore::new();
        store
            .set("repo-1", BranchWritePermissions::default())
            .await
            .unwrap();

        let disabled = BranchWritePermissions::new(false, Default::default());
        store.set("repo-1", disabled.clone()).await.unwrap();

        assert_eq!(store.get("repo-1").await.unwrap(), Some(disabled));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryConfigurationStore::new();
        let other = store.clone();
        store
            .set("b", BranchWritePermissions::default())
            .await
            .unwrap();
        other
            .set("a", BranchWritePermissions::default())
            .await
            .unwrap();

        assert_eq!(store.repositories().await.unwrap(), vec!["a", "b"]);
    }
}
