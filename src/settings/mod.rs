//! Configuration management.
//!
//! Config items live in the database and fall back to a dotenv file. Keys
//! that look like credentials are masked in listings and only returned raw on
//! an explicit reveal; a masked placeholder sent back on save is skipped so
//! it never overwrites the real value.

mod env_file;
pub mod masking;
mod panel;
mod service;

#[cfg(test)]
mod tests;

pub use env_file::load_env_file;
pub use panel::SettingsPanel;
pub use service::{ConfigSource, EffectiveConfig, SettingsService, UpdateOutcome};

use crate::db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{0}")]
    Db(#[from] DbError),
    #[error("cannot read env file {path}: {message}")]
    EnvFile { path: String, message: String },
    #[error("invalid config key: {0:?}")]
    InvalidKey(String),
}
