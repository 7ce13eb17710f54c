// src/utils/mod.rs
pub mod canonical;
pub mod crypto;
