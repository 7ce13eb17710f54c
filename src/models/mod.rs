// src/models/mod.rs
pub mod credential;
pub mod did;
pub mod presentation;
pub mod subject;

#[cfg(test)]
pub(crate) mod fixtures;
