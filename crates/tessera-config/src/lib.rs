//! Settings for the section build pipeline and the headless runner.
//!
//! [`Config`] lives in `config.ron`; unknown keys are ignored and missing
//! ones take their defaults. [`CliArgs`] overrides individual values for one
//! run without touching the file.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, MeshingConfig, WorldConfig, config_path, default_config_dir,
};
pub use error::ConfigError;
