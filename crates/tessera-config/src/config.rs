//! The config tree and its `config.ron` persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const APP_NAME: &str = "tessera";
const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Section build pipeline settings.
    pub meshing: MeshingConfig,
    /// World generation settings used by the headless runner.
    pub world: WorldConfig,
    /// Logging switches.
    pub debug: DebugConfig,
}

/// Section build pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshingConfig {
    /// Number of build worker threads. `0` picks one per logical CPU, leaving
    /// one for the render thread.
    pub worker_count: usize,
    /// Maximum number of builds in flight at once.
    pub task_budget: usize,
    /// Maximum number of finished builds applied per drain (`0` = unlimited).
    pub uploads_per_frame: usize,
}

/// World configuration for the headless runner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Horizontal radius, in chunk columns, of the area that gets built.
    pub view_radius: u32,
    /// Number of vertical sections per chunk column.
    pub section_height: u32,
    /// Seed for the terrain generator.
    pub seed: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// `EnvFilter` directive, e.g. `"debug,tessera_mesh=trace"`.
    pub log_level: String,
    /// Also write JSON logs to the log directory.
    pub log_to_file: bool,
}

impl MeshingConfig {
    /// Resolves `worker_count`, substituting the CPU-derived default for `0`.
    pub fn effective_workers(&self) -> usize {
        if self.worker_count > 0 {
            return self.worker_count;
        }
        num_workers_for(num_cpus::get())
    }
}

/// One worker per logical CPU minus the render thread, never fewer than one.
fn num_workers_for(cpus: usize) -> usize {
    cpus.saturating_sub(1).max(1)
}

impl Default for MeshingConfig {
    fn default() -> Self {
        Self {
            worker_count: 0,
            task_budget: 64,
            uploads_per_frame: 0,
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            view_radius: 4,
            section_height: 8,
            seed: 0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

/// Platform configuration directory for Tessera (`<os config dir>/tessera`).
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigDir`] if the OS does not expose one.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

/// Path of the config file inside `config_dir`.
pub fn config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE)
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl Config {
    /// Reads `config.ron` from `config_dir`, writing the defaults there first
    /// if the file does not exist yet.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_path(config_dir);
        if !path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Wrote default config to {}", path.display());
            return Ok(config);
        }
        let config = read_config(&path)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Writes the config to `config_dir/config.ron`, creating the directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = config_path(config_dir);
        let write_err = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_err)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .struct_names(false)
            .enumerate_arrays(false);
        let text = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(&path, text).map_err(write_err)
    }

    /// Re-reads the file. `Some` only when its contents differ from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = read_config(&config_path(config_dir))?;
        if fresh == *self {
            return Ok(None);
        }
        log::info!("Config changed on disk");
        Ok(Some(fresh))
    }
}
