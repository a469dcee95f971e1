//! Configuration file discovery and loading.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Config;
use crate::error::{Result, ZanzibarError};

const CONFIG_FILE: &str = "zanzibar.kdl";

impl Config {
    /// Get the explicit ~/.config/zanzibar/zanzibar.kdl path (XDG-style, cross-platform)
    fn xdg_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".config/zanzibar").join(CONFIG_FILE))
    }

    /// Get the list of config file search paths in priority order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. ./zanzibar.kdl (project-local config)
        paths.push(PathBuf::from(CONFIG_FILE));

        // 2. ~/.config/zanzibar/zanzibar.kdl
        if let Some(xdg_path) = Self::xdg_config_path() {
            paths.push(xdg_path);
        }

        // 3. Platform-native config directory (~/Library/Application Support/ on macOS)
        // Skip if it's the same as the XDG path (e.g., on Linux where they're identical)
        if let Some(config_dir) = dirs::config_dir() {
            let native_path = config_dir.join("zanzibar").join(CONFIG_FILE);
            if Self::xdg_config_path().as_ref() != Some(&native_path) {
                paths.push(native_path);
            }
        }

        paths
    }

    /// Find existing config file by searching all standard locations
    pub fn find_existing_config() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|path| path.exists())
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let name = path.display().to_string();
        knuffel::parse::<Config>(&name, &content)
            .map_err(|e| ZanzibarError::config(format!("{}: {}", name, e)))
    }

    /// Load configuration from zanzibar.kdl, searching multiple locations.
    /// Returns an empty config if no file is found.
    pub fn load() -> Result<Self> {
        match Self::find_existing_config() {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::load_from_path(&path)
            }
            None => Ok(Config::default()),
        }
    }
}
