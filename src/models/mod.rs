//! Data Models
//!
//! Configuration and result structures owned by the main crate. Per-resource
//! check and result types live in `deep_validate_checks`.

pub mod config;
pub mod conversation;
pub mod flow;

pub use config::*;
pub use conversation::*;
pub use flow::*;
