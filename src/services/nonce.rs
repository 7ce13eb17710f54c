// src/services/nonce.rs
//! Single-use challenge nonces for presentation verification.
//!
//! Each client (identified by an opaque key, typically its network origin)
//! holds at most one live nonce. Issuing a new nonce replaces the old one.
//! Consuming always deletes the stored nonce, whether or not it matched, so
//! a nonce can never be presented twice.

use crate::error::ExternalCollaboratorError;
use crate::settings::Settings;
use anyhow::anyhow;
use async_trait::async_trait;
use log::debug;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[async_trait]
pub trait NonceStore: Send + Sync {
    /// Generates and records a fresh nonce for `client_key`, replacing any
    /// earlier one.
    async fn issue(&self, client_key: &str) -> Result<String, ExternalCollaboratorError>;

    /// Returns true iff a live nonce for `client_key` equals `presented`.
    /// The stored nonce is deleted either way.
    async fn consume(
        &self,
        client_key: &str,
        presented: &str,
    ) -> Result<bool, ExternalCollaboratorError>;
}

struct NonceRecord {
    nonce: String,
    issued_at: Instant,
}

/// Process-local nonce store.
///
/// All access goes through one mutex; `consume` removes the record inside
/// the critical section, so concurrent consumes for the same client cannot
/// both succeed.
pub struct MemoryNonceStore {
    records: Mutex<HashMap<String, NonceRecord>>,
    ttl: Duration,
}

impl MemoryNonceStore {
    pub fn new(ttl: Duration) -> Self {
        MemoryNonceStore {
            records: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.nonce_ttl())
    }

    /// Records a nonce handed out by an external collaborator.
    ///
    /// Expired records of other clients are dropped on the way, so clients
    /// that never come back do not accumulate.
    pub fn insert(&self, client_key: &str, nonce: &str) -> Result<(), ExternalCollaboratorError> {
        let ttl = self.ttl;
        let mut records = self.lock()?;
        records.retain(|_, record| record.issued_at.elapsed() < ttl);
        records.insert(
            client_key.to_string(),
            NonceRecord {
                nonce: nonce.to_string(),
                issued_at: Instant::now(),
            },
        );
        debug!("recorded nonce for client {}", client_key);
        Ok(())
    }

    /// Drops every expired record and returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize, ExternalCollaboratorError> {
        let ttl = self.ttl;
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|_, record| record.issued_at.elapsed() < ttl);
        Ok(before - records.len())
    }

    /// Number of live and not yet purged records.
    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, NonceRecord>>, ExternalCollaboratorError> {
        self.records
            .lock()
            .map_err(|_| ExternalCollaboratorError::NonceStore(anyhow!("nonce store lock poisoned")))
    }
}

#[async_trait]
impl NonceStore for MemoryNonceStore {
    async fn issue(&self, client_key: &str) -> Result<String, ExternalCollaboratorError> {
        let nonce = generate_nonce();
        self.insert(client_key, &nonce)?;
        Ok(nonce)
    }

    async fn consume(
        &self,
        client_key: &str,
        presented: &str,
    ) -> Result<bool, ExternalCollaboratorError> {
        let record = self.lock()?.remove(client_key);
        let accepted = match record {
            Some(record) => record.issued_at.elapsed() < self.ttl && record.nonce == presented,
            None => false,
        };
        debug!("consumed nonce for client {} (accepted: {})", client_key, accepted);
        Ok(accepted)
    }
}

/// 32 random bytes, base64url encoded.
fn generate_nonce() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::encode_config(bytes, base64::URL_SAFE_NO_PAD)
}
