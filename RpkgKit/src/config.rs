//! Persisted toolkit settings

use std::fs;
use std::path::{Path, PathBuf};

use rpkgcore::converter::plugin::GameVersion;
use serde::{Deserialize, Serialize};

use crate::error::Result;

fn default_true() -> bool {
    true
}

/// Toolkit configuration, stored as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitConfig {
    /// Hash list to load when none is given explicitly. Unset means the
    /// default location next to the executable.
    #[serde(default)]
    pub hash_list_path: Option<PathBuf>,
    /// Resource library providing converters.
    #[serde(default)]
    pub resource_lib_path: Option<PathBuf>,
    #[serde(default)]
    pub game: GameVersion,
    /// Prefer simple JSON output over verbose.
    #[serde(default = "default_true")]
    pub simple_output: bool,
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            hash_list_path: None,
            resource_lib_path: None,
            game: GameVersion::default(),
            simple_output: true,
        }
    }
}

impl KitConfig {
    /// Location of the user's config file.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("RpkgKit").join("config.json"))
    }

    /// Load config from disk, or return default
    #[must_use]
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| Self::load_from(&path).ok())
            .unwrap_or_default()
    }

    /// Load config from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save config to the user's config file.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            crate::Error::Config("no configuration directory on this platform".to_string())
        })?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = KitConfig::default();
        assert_eq!(config.hash_list_path, None);
        assert_eq!(config.game, GameVersion::HM3);
        assert!(config.simple_output);
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.json");

        let config = KitConfig {
            hash_list_path: Some(PathBuf::from("/data/hash_list.txt")),
            resource_lib_path: Some(PathBuf::from("ResourceLib_HM2.dll")),
            game: GameVersion::HM2,
            simple_output: false,
        };
        config.save_to(&path).unwrap();

        assert_eq!(KitConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"game":"HM2016"}"#).unwrap();

        let config = KitConfig::load_from(&path).unwrap();
        assert_eq!(config.game, GameVersion::HM2016);
        assert!(config.simple_output);
        assert_eq!(config.hash_list_path, None);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(KitConfig::load_from(&path).is_err());
    }
}
