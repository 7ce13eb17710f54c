// src/contracts/mod.rs
pub mod credential_registry;
pub mod did_registry;
