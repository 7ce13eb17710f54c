// src/models/did.rs
//! Decentralized Identifier (DID) data model implementation.
//!
//! Defines the DID Document structure following the
//! [DID Core Specification](https://www.w3.org/TR/did-core/). Documents are
//! read-only to this crate: they are produced at identity registration and
//! only ever resolved here.

use crate::error::DocumentError;
use crate::utils::crypto::decode_public_key;
use k256::ecdsa::VerifyingKey;
use serde::{Deserialize, Serialize};

/// A DID Document representing a decentralized identity.
///
/// # Invariant
/// `authentication` must name the `id` of one of the document's
/// `verification_method` entries. [`DIDDocument::validate`] checks this.
///
/// # DID Format
/// The `id` field follows DID syntax:
/// ```text
/// did:<method>:<method-specific-id>
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DIDDocument {
    #[serde(rename = "@context", default)]
    pub context: Vec<String>,

    /// The complete DID string identifier
    /// Example: "did:metablox:HFXPiudexfvsJBqABNmBp785YwaKGjo95kmDpBxhMMYo"
    pub id: String,

    #[serde(default)]
    pub created: String,

    #[serde(default)]
    pub updated: String,

    #[serde(default)]
    pub version: u32,

    /// Keys controlled by this identity, in declaration order
    #[serde(default)]
    pub verification_method: Vec<VerificationMethod>,

    /// Id of the verification method usable for authentication
    pub authentication: String,

    #[serde(default)]
    pub service: Vec<Service>,
}

/// A public key declared by a DID document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct VerificationMethod {
    /// DID URL of the key, e.g. "did:metablox:abc#verification"
    pub id: String,

    /// Key suite, e.g. "EcdsaSecp256k1VerificationKey2019"
    #[serde(rename = "type")]
    pub method_type: String,

    pub controller: String,

    /// Multibase-encoded SEC1 public key
    #[serde(rename = "publicKeyMultibase")]
    pub public_key_multibase: String,
}

/// A service endpoint advertised by a DID document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,

    #[serde(rename = "type")]
    pub service_type: String,

    pub service_endpoint: String,
}

impl VerificationMethod {
    /// Decodes the multibase key into a secp256k1 verifying key.
    pub fn public_key(&self) -> Result<VerifyingKey, DocumentError> {
        Ok(decode_public_key(&self.public_key_multibase)?)
    }
}

impl DIDDocument {
    /// Looks up a verification method by its full id.
    pub fn verification_method(&self, method_id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| vm.id == method_id)
    }

    /// Returns the verification method named by `authentication`.
    pub fn authentication_method(&self) -> Result<&VerificationMethod, DocumentError> {
        self.verification_method(&self.authentication)
            .ok_or_else(|| DocumentError::MissingAuthentication(self.authentication.clone()))
    }

    /// Resolves `method_id` to a verifying key declared by this document.
    pub fn public_key_for(&self, method_id: &str) -> Result<VerifyingKey, DocumentError> {
        self.verification_method(method_id)
            .ok_or_else(|| DocumentError::UnknownVerificationMethod {
                did: self.id.clone(),
                method: method_id.to_string(),
            })?
            .public_key()
    }

    pub fn add_service(&mut self, service: Service) {
        self.service.push(service);
    }

    /// Checks DID syntax and that `authentication` resolves within the document.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if !is_valid_did(&self.id) {
            return Err(DocumentError::InvalidDid(self.id.clone()));
        }
        self.authentication_method().map(|_| ())
    }
}

/// Checks the `did:<method>:<method-specific-id>` shape.
///
/// The method name must be lowercase alphanumeric; the method-specific id
/// must be non-empty.
pub fn is_valid_did(did: &str) -> bool {
    let mut parts = did.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("did"), Some(method), Some(specific_id)) => {
            !method.is_empty()
                && method
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
                && !specific_id.is_empty()
        }
        _ => false,
    }
}
