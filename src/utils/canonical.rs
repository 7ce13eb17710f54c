// src/utils/canonical.rs
//! Canonical encoding of credentials and presentations.
//!
//! Produces the single byte representation that is signed and verified:
//! RFC 8785 canonical JSON (via `serde_jcs`) with the proof's `jws` value
//! blanked to `""`. All other proof fields (type,
//! created, verificationMethod, proofPurpose, nonce) are part of the signed
//! bytes.
//!
//! A credential's `revoked` flag is left out: revocation is a status
//! overlay and must not invalidate the issuance signature. The storage-only
//! `subtype` mirror never serializes in the first place.

use crate::error::EncodingError;
use crate::models::credential::VerifiableCredential;
use crate::models::presentation::VerifiablePresentation;
use serde::Serialize;
use serde_json::Value;

/// Objects that have a canonical signing form.
pub trait Canonicalize {
    /// JSON tree to be written in canonical order.
    fn canonical_value(&self) -> Result<Value, EncodingError>;
}

/// Encodes `obj` into its canonical bytes (RFC 8785 JSON canonicalization).
///
/// Repeated calls on equal objects return identical bytes regardless of
/// the order their fields were populated or parsed in.
pub fn encode<T: Canonicalize + ?Sized>(obj: &T) -> Result<Vec<u8>, EncodingError> {
    let value = obj.canonical_value()?;
    Ok(serde_jcs::to_vec(&value)?)
}

impl Canonicalize for VerifiableCredential {
    fn canonical_value(&self) -> Result<Value, EncodingError> {
        if self.vc_type.is_empty() {
            return Err(EncodingError::MissingField("type"));
        }
        if self.issuer.is_empty() {
            return Err(EncodingError::MissingField("issuer"));
        }
        let mut value = blank_signature(self)?;
        if let Value::Object(map) = &mut value {
            map.remove("revoked");
        }
        Ok(value)
    }
}

impl Canonicalize for VerifiablePresentation {
    fn canonical_value(&self) -> Result<Value, EncodingError> {
        if self.vp_type.is_empty() {
            return Err(EncodingError::MissingField("type"));
        }
        if self.holder.is_empty() {
            return Err(EncodingError::MissingField("holder"));
        }
        // embedded credentials are covered exactly as transmitted
        blank_signature(self)
    }
}

fn blank_signature<T: Serialize>(obj: &T) -> Result<Value, EncodingError> {
    let mut value = serde_json::to_value(obj)?;
    let proof = value
        .get_mut("proof")
        .and_then(Value::as_object_mut)
        .ok_or(EncodingError::MissingField("proof"))?;
    let signed_by = proof
        .get("verificationMethod")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if signed_by.is_empty() {
        return Err(EncodingError::MissingField("proof.verificationMethod"));
    }
    proof.insert("jws".to_string(), Value::String(String::new()));
    Ok(value)
}
