// src/wallet/key_management.rs
//! Credential signing keys and signature verification.
//!
//! Signing is exposed as an explicit capability ([`CredentialSigner`]) that
//! callers thread into issuance, renewal and presentation calls. Nothing in
//! this crate reads a key from process-wide state; loading a keystore is the
//! embedding application's concern.
//!
//! Uses the following cryptographic primitives:
//! - secp256k1 curve (via `k256` crate)
//! - SHA-256 prehashing of canonical bytes
//! - Cryptographically secure random number generation

use crate::error::SignatureError;
use crate::utils::crypto::{encode_public_key, hash_data};
use crate::wallet::jws;
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use std::fmt;

/// A key handle able to sign canonical bytes.
pub trait CredentialSigner: Send + Sync {
    /// Signs `message` and returns the compact detached JWS.
    fn sign(&self, message: &[u8]) -> Result<String, SignatureError>;

    /// Public half of the signing key.
    fn verifying_key(&self) -> VerifyingKey;
}

/// In-process secp256k1 signing key.
///
/// # Security Notes
/// - The secret key is never exposed or logged (`Debug` prints the public key only)
/// - Signatures use deterministic ECDSA (RFC 6979) with low-S normalization
#[derive(Clone)]
pub struct KeyManager {
    /// Securely stored private key (never exposed)
    signing_key: SigningKey,
    /// Derived public key for verification
    pub public_key: VerifyingKey,
}

impl KeyManager {
    /// Generates a KeyManager with a fresh random key.
    pub fn new() -> Self {
        Self::from_signing_key(SigningKey::random(&mut rand::thread_rng()))
    }

    /// Loads a key from its 32-byte big-endian scalar.
    pub fn from_bytes(secret: &[u8]) -> Result<Self, SignatureError> {
        let signing_key = SigningKey::from_slice(secret)
            .map_err(|e| SignatureError::InvalidKey(format!("secret key: {}", e)))?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = VerifyingKey::from(&signing_key);
        KeyManager {
            signing_key,
            public_key,
        }
    }

    /// Multibase form of the public key, as published in DID documents.
    pub fn public_key_multibase(&self) -> String {
        encode_public_key(&self.public_key)
    }

    /// Signs a message using ECDSA (secp256k1) over its SHA-256 digest.
    ///
    /// # Returns
    /// 64-byte compact ECDSA signature (R || S values)
    pub fn sign_message(&self, message: &[u8]) -> Result<Signature, SignatureError> {
        let hash = hash_data(message);
        let signature: Signature = self
            .signing_key
            .sign_prehash(&hash)
            .map_err(|e| SignatureError::Signing(e.to_string()))?;
        Ok(signature)
    }
}

impl Default for KeyManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyManager")
            .field("public_key", &self.public_key_multibase())
            .finish_non_exhaustive()
    }
}

impl CredentialSigner for KeyManager {
    fn sign(&self, message: &[u8]) -> Result<String, SignatureError> {
        Ok(jws::encode_compact(&self.sign_message(message)?))
    }

    fn verifying_key(&self) -> VerifyingKey {
        self.public_key.clone()
    }
}

/// Checks a compact signature over `message` against `public_key`.
///
/// The digest is always recomputed from `message`; callers pass the
/// canonical bytes of the object as it is now, never a stored digest.
///
/// # Returns
/// - `Ok(true)` if the signature matches
/// - `Ok(false)` if it parses but does not match
/// - `Err(SignatureError::MalformedSignature)` if it cannot be parsed at all
pub fn verify_bytes(
    message: &[u8],
    jws_signature: &str,
    public_key: &VerifyingKey,
) -> Result<bool, SignatureError> {
    let signature = jws::decode_compact(jws_signature)?;
    let hash = hash_data(message);
    Ok(public_key.verify_prehash(&hash, &signature).is_ok())
}
