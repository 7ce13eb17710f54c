// src/utils/crypto.rs
//! Cryptographic utilities shared by signing and verification.
//!
//! Digests are SHA-256, matching the ES256-style compact signatures this
//! system emits. Public keys travel as multibase (base58btc) encoded SEC1
//! points inside DID documents.

use crate::error::SignatureError;
use k256::ecdsa::VerifyingKey;
use multibase::Base;
use sha2::{Digest, Sha256};

/// Computes the SHA-256 digest of `data`.
///
/// # Returns
/// Fixed-size 32-byte array (`[u8; 32]`) containing the hash.
pub fn hash_data(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(data));
    out
}

/// Encodes a verifying key as a multibase string of its uncompressed SEC1 point.
pub fn encode_public_key(key: &VerifyingKey) -> String {
    multibase::encode(Base::Base58Btc, key.to_encoded_point(false).as_bytes())
}

/// Decodes a multibase SEC1 public key (compressed or uncompressed).
pub fn decode_public_key(encoded: &str) -> Result<VerifyingKey, SignatureError> {
    let (_, bytes) = multibase::decode(encoded)
        .map_err(|e| SignatureError::InvalidKey(format!("multibase: {}", e)))?;
    VerifyingKey::from_sec1_bytes(&bytes)
        .map_err(|e| SignatureError::InvalidKey(format!("sec1: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;

    #[test]
    fn test_hash_is_sha256() {
        // SHA-256("abc")
        assert_eq!(
            hash_data(b"abc")[..4],
            [0xba, 0x78, 0x16, 0xbf]
        );
        assert_ne!(hash_data(b"abc"), hash_data(b"abd"));
    }

    #[test]
    fn test_public_key_multibase() {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let key = VerifyingKey::from(&signing_key);
        let encoded = encode_public_key(&key);

        assert!(encoded.starts_with('z'));
        assert_eq!(decode_public_key(&encoded).unwrap(), key);
    }

    #[test]
    fn test_garbage_key_rejected() {
        assert!(matches!(
            decode_public_key("zNotAKey"),
            Err(SignatureError::InvalidKey(_))
        ));
        assert!(decode_public_key("").is_err());
    }
}
