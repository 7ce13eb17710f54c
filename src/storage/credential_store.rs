// src/storage/credential_store.rs
//! Credential persistence contract.
//!
//! The lifecycle manager only needs three things from storage: allocate a
//! credential number, load a credential, and durably save one. A successful
//! `save_credential` means the record is durable; nothing else about the
//! backend's transaction semantics is assumed.

use crate::models::credential::VerifiableCredential;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Reserves the next credential number.
    async fn allocate_id(&self) -> anyhow::Result<u64>;

    /// Loads a credential by its full id. Fails if it does not exist.
    async fn load_credential(&self, id: &str) -> anyhow::Result<VerifiableCredential>;

    /// Inserts or replaces a credential, keyed by its id.
    async fn save_credential(&self, vc: &VerifiableCredential) -> anyhow::Result<()>;
}

/// In-memory credential store.
///
/// - O(1) average case complexity for insertions and lookups
/// - Overwrites an existing record with the same id
pub struct MemoryCredentialStore {
    credentials: Mutex<HashMap<String, VerifiableCredential>>,
    next_id: AtomicU64,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        MemoryCredentialStore {
            credentials: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns a copy of the stored credential, if any.
    pub fn get_credential(&self, id: &str) -> Option<VerifiableCredential> {
        self.credentials.lock().ok()?.get(id).cloned()
    }

    pub fn contains_credential(&self, id: &str) -> bool {
        self.credentials
            .lock()
            .map(|map| map.contains_key(id))
            .unwrap_or(false)
    }

    pub fn count_credentials(&self) -> usize {
        self.credentials.lock().map(|map| map.len()).unwrap_or(0)
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn allocate_id(&self) -> anyhow::Result<u64> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn load_credential(&self, id: &str) -> anyhow::Result<VerifiableCredential> {
        let credentials = self
            .credentials
            .lock()
            .map_err(|_| anyhow!("credential store lock poisoned"))?;
        credentials
            .get(id)
            .cloned()
            .with_context(|| format!("credential `{}` not found", id))
    }

    async fn save_credential(&self, vc: &VerifiableCredential) -> anyhow::Result<()> {
        let mut credentials = self
            .credentials
            .lock()
            .map_err(|_| anyhow!("credential store lock poisoned"))?;
        credentials.insert(vc.id.clone(), vc.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_save_then_load() {
        let store = MemoryCredentialStore::new();
        let vc = fixtures::sample_wifi_access_vc();

        // Initially should not contain
        assert!(!store.contains_credential(&vc.id));
        assert_err!(store.load_credential(&vc.id).await);

        assert_ok!(store.save_credential(&vc).await);
        assert!(store.contains_credential(&vc.id));
        assert_eq!(store.load_credential(&vc.id).await.unwrap(), vc);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = MemoryCredentialStore::new();
        let mut vc = fixtures::sample_wifi_access_vc();
        store.save_credential(&vc).await.unwrap();

        vc.revoked = true;
        store.save_credential(&vc).await.unwrap();

        assert_eq!(store.count_credentials(), 1);
        assert!(store.get_credential(&vc.id).unwrap().revoked);
    }

    #[tokio::test]
    async fn test_allocate_is_sequential() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.allocate_id().await.unwrap(), 1);
        assert_eq!(store.allocate_id().await.unwrap(), 2);
    }
}
