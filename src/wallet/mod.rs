// src/wallet/mod.rs
pub mod jws;
pub mod key_management;
