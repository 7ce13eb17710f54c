// src/contracts/did_registry.rs
//! DID resolution.
//!
//! The trust engine never creates identities; it only resolves a DID to its
//! document. [`DidResolver`] is the seam where a network resolver or
//! registry contract plugs in. [`MemoryDidRegistry`] serves tests and
//! single-process deployments.

use crate::error::{RegistrationError, ResolveError};
use crate::models::did::DIDDocument;
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

#[async_trait]
pub trait DidResolver: Send + Sync {
    /// Resolves `did` to its current document.
    ///
    /// # Errors
    /// `ResolveError::NotFound` if the DID is unknown.
    async fn resolve_did(&self, did: &str) -> Result<DIDDocument, ResolveError>;
}

/// In-memory DID registry keyed by DID.
#[derive(Default)]
pub struct MemoryDidRegistry {
    documents: RwLock<HashMap<String, DIDDocument>>,
}

impl MemoryDidRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document after checking its structure.
    /// Replaces any earlier document for the same DID.
    pub fn register(&self, document: DIDDocument) -> Result<(), RegistrationError> {
        document.validate()?;
        self.documents
            .write()
            .map_err(|_| RegistrationError::Unavailable("DID registry lock poisoned".to_string()))?
            .insert(document.id.clone(), document);
        Ok(())
    }

    pub fn contains(&self, did: &str) -> bool {
        self.documents
            .read()
            .map(|documents| documents.contains_key(did))
            .unwrap_or(false)
    }
}

#[async_trait]
impl DidResolver for MemoryDidRegistry {
    async fn resolve_did(&self, did: &str) -> Result<DIDDocument, ResolveError> {
        let documents = self
            .documents
            .read()
            .map_err(|_| anyhow!("DID registry lock poisoned"))?;
        documents
            .get(did)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(did.to_string()))
    }
}
