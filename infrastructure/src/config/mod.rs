//! Configuration file loading for duet
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables prefixed `DUET_`
//! 2. `--config <path>` specified file
//! 3. Project root: `./duet.toml` or `./.duet.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/duet/config.toml`
//! 5. Default values
//!
//! Command-line flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    FileClientConfig, FileConfig, FileDialogueConfig, FileSchedulerConfig, FileServerConfig,
    FileStorageConfig, RunnerMode,
};
pub use loader::ConfigLoader;

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to load configuration: {0}")]
    Load(Box<figment::Error>),

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
