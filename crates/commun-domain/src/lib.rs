//! Domain types shared across all Commun services.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod booking;
pub mod catalog;
pub mod pagination;
pub mod user;
