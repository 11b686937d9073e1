//! Test utilities for Commun services.
//!
//! Provides `MockAuth` for injecting gateway identity headers.
//! For `#[cfg(test)]` blocks and `tests/` only.

pub mod auth;
