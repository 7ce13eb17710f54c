// src/models/credential.rs
//! Verifiable Credential data model implementation.
//!
//! Defines the W3C-style credential issued by this system and the proof
//! envelope that carries its issuer signature. See the
//! [W3C Verifiable Credentials Data Model](https://www.w3.org/TR/vc-data-model/).

use crate::models::subject::CredentialSubject;
use serde::{Deserialize, Serialize};

/// Marker that always leads a credential's `type` list.
pub const CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// Context URIs attached to every credential and presentation.
pub const CONTEXT_CREDENTIALS_V1: &str = "https://www.w3.org/2018/credentials/v1";
pub const CONTEXT_SECP256K1_2019: &str = "https://ns.did.ai/suites/secp256k1-2019/v1/";

/// Signature suite named in every proof.
pub const PROOF_TYPE: &str = "EcdsaSecp256k1Signature2019";

/// Purpose named in every proof.
pub const PROOF_PURPOSE: &str = "Authentication";

/// A Verifiable Credential.
///
/// `vc_type` holds `["VerifiableCredential", <subtype>]`. The `subtype`
/// scalar mirrors `vc_type[1]` for storage layers that cannot index arrays;
/// it never travels on the wire and is not part of the signed bytes.
///
/// # Trust
/// No field may be trusted until `proof` has been verified against the
/// issuer's resolved key. `revoked` is a status overlay: revoking does not
/// touch `proof`, so callers check it separately after signature verification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    #[serde(rename = "@context", default)]
    pub context: Vec<String>,

    /// Example: "http://metablox.com/credentials/1"
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type", default)]
    pub vc_type: Vec<String>,

    #[serde(skip)]
    pub subtype: String,

    /// DID of the issuer
    #[serde(default)]
    pub issuer: String,

    /// RFC3339 timestamps
    #[serde(default)]
    pub issuance_date: String,
    #[serde(default)]
    pub expiration_date: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub credential_subject: CredentialSubject,

    #[serde(default)]
    pub proof: VCProof,

    #[serde(default)]
    pub revoked: bool,
}

/// Issuer signature envelope.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct VCProof {
    #[serde(rename = "type")]
    pub proof_type: String,

    pub created: String,

    /// DID URL of the signing key, e.g. "did:metablox:abc#verification"
    pub verification_method: String,

    pub proof_purpose: String,

    /// Compact JWS over the canonical credential with this field blanked
    #[serde(rename = "jws")]
    pub jws_signature: String,
}

impl VerifiableCredential {
    /// The subtype tag used to pick the subject schema: the second `type`
    /// entry, falling back to the stored `subtype` mirror.
    pub fn subtype_tag(&self) -> &str {
        self.vc_type
            .get(1)
            .map(String::as_str)
            .unwrap_or(self.subtype.as_str())
    }
}
