// src/services/mod.rs
pub mod credential_issuer;
pub mod holder;
pub mod nonce;
pub mod subject_registry;
pub mod verifier;
