//! HTTP plumbing shared by Commun services: error bodies,
//! request ids, tracing setup and wire-format serializers.

pub mod error;
pub mod middleware;
pub mod serde;
pub mod tracing;
