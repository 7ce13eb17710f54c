// src/contracts/credential_registry.rs
//! External revocation registry.
//!
//! After a revocation is committed locally, the lifecycle manager may
//! notify an external registry (a smart contract or similar) with the
//! credential's digest. The notification is best-effort: its failure is
//! reported to the caller but never rolls back the local revocation.

use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

#[async_trait]
pub trait RevocationRegistry: Send + Sync {
    /// Records that the credential with this digest is revoked.
    async fn register_revocation(&self, credential_digest: [u8; 32]) -> anyhow::Result<()>;
}

/// Registry that accepts every notification and records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRevocationRegistry;

#[async_trait]
impl RevocationRegistry for NoopRevocationRegistry {
    async fn register_revocation(&self, _credential_digest: [u8; 32]) -> anyhow::Result<()> {
        Ok(())
    }
}

/// In-memory registry of revoked credential digests.
#[derive(Debug, Default)]
pub struct MemoryRevocationRegistry {
    revoked: Mutex<HashSet<[u8; 32]>>,
}

impl MemoryRevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether a digest has been registered as revoked.
    pub fn is_revoked(&self, credential_digest: &[u8; 32]) -> bool {
        self.revoked
            .lock()
            .map(|revoked| revoked.contains(credential_digest))
            .unwrap_or(false)
    }
}

#[async_trait]
impl RevocationRegistry for MemoryRevocationRegistry {
    async fn register_revocation(&self, credential_digest: [u8; 32]) -> anyhow::Result<()> {
        self.revoked
            .lock()
            .map_err(|_| anyhow!("revocation registry lock poisoned"))?
            .insert(credential_digest);
        Ok(())
    }
}
