// src/error.rs
//! Error taxonomy for the credential trust engine.
//!
//! Every concern gets its own `thiserror` enum so callers can match on the
//! failure class. Verification functions report "ran and failed" as
//! `Ok(false)`; the enums below describe the cases where an operation could
//! not run to a verdict at all.

use thiserror::Error;

/// The credential or presentation could not be reduced to canonical bytes.
#[derive(Error, Debug)]
pub enum EncodingError {
    /// A field required by the canonical form is empty or absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures of the signing layer that are not a plain signature mismatch.
#[derive(Error, Debug)]
pub enum SignatureError {
    /// The compact signature string could not be split or decoded.
    /// This is a data-corruption signal, unlike a signature that parses but
    /// does not match.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("invalid public key: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

/// Failures of the subject registry.
#[derive(Error, Debug)]
pub enum SubjectError {
    /// The credential's subtype tag has no registered schema.
    #[error("unknown credential type `{0}`")]
    UnknownCredentialType(String),

    #[error("credential subject does not fit the `{tag}` schema: {source}")]
    Conversion {
        tag: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Structural problems with a DID document or with the key used against it.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("`{0}` is not a valid DID")]
    InvalidDid(String),

    /// `authentication` does not name a verification method of the document.
    #[error("authentication method `{0}` is not declared in the document")]
    MissingAuthentication(String),

    #[error("verification method `{method}` is not declared by `{did}`")]
    UnknownVerificationMethod { did: String, method: String },

    /// The signing key does not belong to the document's authentication method.
    #[error("signing key does not match authentication method `{0}`")]
    KeyMismatch(String),

    #[error(transparent)]
    Key(#[from] SignatureError),
}

/// A DID document could not be registered.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("DID registry unavailable: {0}")]
    Unavailable(String),
}

/// DID resolution failures.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("DID `{0}` not found")]
    NotFound(String),

    #[error("DID resolution failed: {0:#}")]
    Other(#[from] anyhow::Error),
}

/// Failures reported by the collaborators this crate does not own:
/// DID resolution, credential persistence, the revocation registry and the
/// nonce backend.
#[derive(Error, Debug)]
pub enum ExternalCollaboratorError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("credential store failure: {0:#}")]
    Store(anyhow::Error),

    #[error("revocation registry failure: {0:#}")]
    Registry(anyhow::Error),

    #[error("nonce store failure: {0:#}")]
    NonceStore(anyhow::Error),
}

/// A single credential could not be checked.
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Subject(#[from] SubjectError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    External(#[from] ExternalCollaboratorError),
}

/// Presentation assembly or verification could not run.
#[derive(Error, Debug)]
pub enum PresentationError {
    /// Missing, mismatched, expired or already consumed nonce.
    #[error("invalid nonce presented by client `{0}`")]
    InvalidNonce(String),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    External(#[from] ExternalCollaboratorError),
}

/// Issue, renew and revoke failures. None of these leave a partially updated
/// credential behind: the persisted record stays at its last committed state.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// The credential is revoked; `Revoked` is terminal.
    #[error("credential `{0}` is revoked")]
    Revoked(String),

    /// The credential's current proof does not verify, so it cannot be renewed.
    #[error("credential `{0}` does not verify against the issuer key")]
    InvalidProof(String),

    /// Renewal policy forbids extending an already expired credential.
    #[error("credential `{id}` expired at {expired_at} and may not be renewed")]
    ExpiredBeyondRenewal { id: String, expired_at: String },

    #[error("invalid date `{value}`: {reason}")]
    InvalidDate { value: String, reason: String },

    /// The presentation wrapping the credential did not verify.
    #[error("presentation rejected")]
    PresentationRejected,

    #[error("presentation carries no credentials")]
    EmptyPresentation,

    /// A presented credential's issuer or subject differs from the stored
    /// record with the same id.
    #[error("presented credential `{0}` does not match the stored record")]
    CredentialMismatch(String),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Subject(#[from] SubjectError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Presentation(#[from] PresentationError),

    #[error(transparent)]
    External(#[from] ExternalCollaboratorError),
}
