//! # strata-core
//!
//! Foundation crate for the Strata sync engine.
//! Defines the event and status data model, collaborator traits, errors,
//! config, and repository vocabulary constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod paths;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::StrataConfig;
pub use errors::{StrataError, StrataResult};
pub use models::{Event, StatusAction, StatusRecord, UpdateType};
