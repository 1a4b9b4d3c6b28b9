use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::errors::ConfigError;
use crate::model::Category;
use crate::safety::PolicyConfig;

/// Global reclaim configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Output format preference
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Retention, guards and extra protected paths
    #[serde(default)]
    pub safety: PolicyConfig,

    #[serde(default)]
    pub cleanup: CleanupConfig,

    /// Per-category enabled override, keyed by category id
    #[serde(default)]
    pub categories: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleanupConfig {
    /// Overrides the host-derived worker count when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,

    /// Move to trash instead of deleting permanently
    #[serde(default = "default_use_trash")]
    pub use_trash: bool,
}

fn default_use_trash() -> bool {
    true
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            max_workers: None,
            use_trash: default_use_trash(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Quiet,
}

impl Config {
    /// Get the reclaim data directory (~/.reclaim)
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(".reclaim")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Directory backing the staging trash
    pub fn trash_dir() -> PathBuf {
        Self::data_dir().join("trash")
    }

    /// Get the logs directory
    pub fn logs_dir() -> PathBuf {
        Self::data_dir().join("logs")
    }

    /// Load config from the default location, or defaults if absent
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Initialize all reclaim directories
    pub fn init_dirs() -> Result<(), ConfigError> {
        for dir in [Self::data_dir(), Self::trash_dir(), Self::logs_dir()] {
            std::fs::create_dir_all(&dir).map_err(|source| ConfigError::Write {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Configured override, falling back to the category's default
    pub fn is_category_enabled(&self, category: &Category) -> bool {
        self.categories
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(category.id))
            .map(|(_, enabled)| *enabled)
            .unwrap_or(category.default_enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::category;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert!(config.cleanup.use_trash);
        assert_eq!(config.safety.recent_file_guard_hours, 48);
        assert_eq!(config.output_format, OutputFormat::Human);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "output_format = \"json\"\n\n[safety]\nrecent_file_guard_hours = 6\n\n[categories]\n\"cache.browser\" = true\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.safety.recent_file_guard_hours, 6);
        assert_eq!(config.safety.min_age_default_hours, 24);
        assert!(config.is_category_enabled(&category::BROWSER_CACHE));
        assert!(config.is_category_enabled(&category::USER_TEMP));
        assert!(!config.is_category_enabled(&category::TRASH));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.cleanup.max_workers = Some(3);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.cleanup.max_workers, Some(3));
        assert_eq!(loaded.safety, config.safety);
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "safety = [").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }
}
