use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

/// Application configuration loaded from an optional TOML file.
/// Every field has a default; a missing file is not an error.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Dataset opened at startup. When unset the shell waits for File → Open.
    pub data_path: Option<PathBuf>,
    /// Dashboard worker threads. 0 = auto-detect (cores / 2, min 1).
    pub workers: usize,
    pub window: WindowConfig,
}

/// Initial window geometry.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 900.0,
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/tune-stats/config.toml`.
    /// Falls back to defaults, with a warning, when the file is unreadable.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    /// Resolve worker count: 0 → auto-detect (cores / 2, min 1).
    pub fn resolve_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            let cores = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(2);
            (cores / 2).max(1)
        }
    }

    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME).map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str("workers = 3\n[window]\nwidth = 800.0\n").unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.window.width, 800.0);
        assert_eq!(config.window.height, 900.0);
        assert_eq!(config.data_path, None);
    }

    #[test]
    fn test_broken_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "workers = \"many\"").unwrap();
        assert_eq!(AppConfig::load_from(&path), AppConfig::default());
        assert_eq!(AppConfig::load_from(&dir.path().join("absent.toml")), AppConfig::default());
    }

    #[test]
    fn test_resolve_workers() {
        let fixed = AppConfig {
            workers: 6,
            ..Default::default()
        };
        assert_eq!(fixed.resolve_workers(), 6);
        assert!(AppConfig::default().resolve_workers() >= 1);
    }
}
