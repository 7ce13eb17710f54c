// src/wallet/jws.rs
//! Compact detached JWS codec.
//!
//! Signatures travel as `<header>..<signature>`: a fixed base64url header
//! (`{"alg":"ES256"}`), an empty payload segment (the payload is the
//! canonical credential bytes, carried separately), and the base64url
//! encoded 64-byte `r || s` ECDSA signature.

use crate::error::SignatureError;
use k256::ecdsa::Signature;
use once_cell::sync::Lazy;
use serde::Deserialize;

const ALGORITHM: &str = "ES256";

/// Base64url form of the fixed header, `eyJhbGciOiJFUzI1NiJ9`.
static HEADER: Lazy<String> = Lazy::new(|| {
    base64::encode_config(format!(r#"{{"alg":"{}"}}"#, ALGORITHM), base64::URL_SAFE_NO_PAD)
});

#[derive(Deserialize)]
struct Header {
    alg: String,
}

/// Encodes a signature into its compact detached form.
pub fn encode_compact(signature: &Signature) -> String {
    let sig_b64 = base64::encode_config(signature.to_bytes().as_slice(), base64::URL_SAFE_NO_PAD);
    format!("{}..{}", HEADER.as_str(), sig_b64)
}

/// Parses a compact detached JWS back into a signature.
///
/// # Errors
/// `SignatureError::MalformedSignature` if the string does not have three
/// segments, carries an attached payload, names another algorithm, or the
/// signature segment is not a valid 64-byte scalar pair.
pub fn decode_compact(jws: &str) -> Result<Signature, SignatureError> {
    let (header_b64, signature_b64) = split_detached(jws)?;

    let header_json = base64::decode_config(header_b64, base64::URL_SAFE_NO_PAD)
        .map_err(|e| malformed(format!("header encoding: {}", e)))?;
    let header: Header = serde_json::from_slice(&header_json)
        .map_err(|e| malformed(format!("header json: {}", e)))?;
    if header.alg != ALGORITHM {
        return Err(malformed(format!("unsupported algorithm `{}`", header.alg)));
    }

    let signature = base64::decode_config(signature_b64, base64::URL_SAFE_NO_PAD)
        .map_err(|e| malformed(format!("signature encoding: {}", e)))?;
    Signature::from_slice(&signature).map_err(|e| malformed(format!("signature value: {}", e)))
}

fn split_detached(jws: &str) -> Result<(&str, &str), SignatureError> {
    let mut parts = jws.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(""), Some(signature), None) => Ok((header, signature)),
        (Some(_), Some(_), Some(_), None) => Err(malformed("attached payload".to_string())),
        _ => Err(malformed("expected three segments".to_string())),
    }
}

fn malformed(reason: String) -> SignatureError {
    SignatureError::MalformedSignature(reason)
}
