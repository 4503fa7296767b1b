//! Configuration module for Gantry.
//!
//! Handles source-database connection info, environment variables, and the
//! optional TOML settings file.

mod connection;
mod settings;

pub use connection::{ConnectionConfig, ConnectionError, SourceKind};
pub use settings::{expand_env_vars, EngineSettings, Settings, SettingsError};
