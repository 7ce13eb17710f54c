// src/models/presentation.rs
//! Verifiable Presentation data model.
//!
//! A presentation wraps one or more credentials in a holder-signed envelope
//! whose proof is bound to a verifier-issued nonce.

use crate::models::credential::VerifiableCredential;
use serde::{Deserialize, Serialize};

/// Marker that leads a presentation's `type` list.
pub const PRESENTATION_TYPE: &str = "VerifiablePresentation";

/// A holder-signed bundle of credentials.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VerifiablePresentation {
    #[serde(rename = "@context", default)]
    pub context: Vec<String>,

    #[serde(rename = "type", default)]
    pub vp_type: Vec<String>,

    /// Embedded credentials, in presentation order
    #[serde(default)]
    pub verifiable_credential: Vec<VerifiableCredential>,

    /// DID of the presenter
    #[serde(default)]
    pub holder: String,

    #[serde(default)]
    pub proof: VPProof,
}

/// Holder signature envelope. Same shape as the credential proof plus the
/// challenge nonce the holder was handed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct VPProof {
    #[serde(rename = "type")]
    pub proof_type: String,

    pub created: String,

    pub verification_method: String,

    pub proof_purpose: String,

    #[serde(rename = "jws")]
    pub jws_signature: String,

    pub nonce: String,
}
