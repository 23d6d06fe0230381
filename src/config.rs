use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::session::SessionConfig;

/// Persisted operator settings; the CLI overrides these per invocation and
/// the merged result is written back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub thickness: u32,
    pub speed_ms: u64,
    pub grid_width: u32,
    pub grid_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        SessionConfig::default().into()
    }
}

impl Config {
    /// The grid must have at least one cell and the stimulus must have a
    /// width and a switch period; the CLI enforces the same lower bounds.
    fn is_valid(&self) -> bool {
        self.thickness >= 1 && self.speed_ms >= 1 && self.grid_width >= 1 && self.grid_height >= 1
    }
}

impl From<SessionConfig> for Config {
    fn from(sc: SessionConfig) -> Self {
        Self {
            thickness: sc.thickness,
            speed_ms: sc.speed_ms,
            grid_width: sc.grid_width,
            grid_height: sc.grid_height,
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            thickness: cfg.thickness,
            speed_ms: cfg.speed_ms,
            grid_width: cfg.grid_width,
            grid_height: cfg.grid_height,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "knipper") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("knipper_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                if cfg.is_valid() {
                    return cfg;
                }
                log::warn!("ignoring config with zero field: {}", self.path.display());
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
