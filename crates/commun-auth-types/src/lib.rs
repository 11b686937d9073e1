//! Auth types shared across Commun services.
//!
//! Authentication itself happens upstream: the gateway validates the session
//! cookie and forwards the caller's identity as headers. This crate provides
//! the header names and the `IdentityHeaders` extractor.

pub mod identity;
