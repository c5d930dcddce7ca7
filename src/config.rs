//! Configuration loading for Genreshelf
//!
//! Settings live in a TOML file in the XDG config directory
//! (`~/.config/genreshelf/config.toml` on Linux). Every section is optional and
//! falls back to defaults; a missing file means all defaults.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::author::WIKIPEDIA_BASE_URL;
use crate::data::catalog::GOOGLE_BOOKS_BASE_URL;

/// Environment variable that overrides `catalog.api_key`
pub const API_KEY_ENV: &str = "GOOGLE_BOOKS_API_KEY";

/// Genres cached by default, in display order
const DEFAULT_CATEGORIES: [&str; 8] = [
    "romance", "fiction", "thriller", "action", "mystery", "history", "horror", "fantasy",
];

/// Offset the cursors start from; the first page is shown at seed time
const DEFAULT_START_OFFSET: u32 = 7;

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config parsed but holds unusable values
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub author: AuthorConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

/// Upstream catalog API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: GOOGLE_BOOKS_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: 10,
            user_agent: concat!("genreshelf/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Author lookup API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    pub base_url: String,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        Self {
            base_url: WIKIPEDIA_BASE_URL.to_string(),
        }
    }
}

/// A cached genre and the offset its cursor starts at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    #[serde(default = "default_start_offset")]
    pub start_offset: u32,
}

fn default_start_offset() -> u32 {
    DEFAULT_START_OFFSET
}

impl CategoryConfig {
    pub fn new(name: impl Into<String>, start_offset: u32) -> Self {
        Self {
            name: name.into(),
            start_offset,
        }
    }
}

/// Cache sizing and the fixed category set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Batch limit for warm-ups and extends
    pub warm_limit: u32,
    /// Items handed out per drain
    pub drain_size: usize,
    pub categories: Vec<CategoryConfig>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            warm_limit: 7,
            drain_size: 7,
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|name| CategoryConfig::new(*name, DEFAULT_START_OFFSET))
                .collect(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Log file used while the terminal UI is running
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Returns the default config file path, if a home directory exists
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "genreshelf").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Returns the config file `load` would read, or `None` when it would
    /// fall back to defaults
    pub fn existing_file(path: Option<&Path>) -> Option<PathBuf> {
        path.map(Path::to_path_buf)
            .or_else(Self::default_path)
            .filter(|path| path.exists())
    }

    /// Loads configuration from `path`, or the default location when `None`
    ///
    /// A missing file yields defaults. The API key environment variable is
    /// applied last, and the result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match Self::existing_file(path) {
            Some(path) => {
                let content = fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Io { path, source })?;
                Self::from_toml(&content)?
            }
            None => Config::default(),
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                config.catalog.api_key = Some(key);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Checks the values the cache manager relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.categories.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one cache category is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for category in &self.cache.categories {
            if category.name.trim().is_empty() {
                return Err(ConfigError::Invalid("category names cannot be empty".to_string()));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "category '{}' is listed more than once",
                    category.name
                )));
            }
        }

        if self.cache.warm_limit == 0 {
            return Err(ConfigError::Invalid("cache.warm_limit must be positive".to_string()));
        }
        if self.cache.drain_size == 0 {
            return Err(ConfigError::Invalid("cache.drain_size must be positive".to_string()));
        }

        Ok(())
    }

    /// Returns true if `name` is one of the configured categories
    pub fn has_category(&self, name: &str) -> bool {
        self.cache.categories.iter().any(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_matches_seed_genres() {
        let config = Config::default();

        assert_eq!(config.cache.warm_limit, 7);
        assert_eq!(config.cache.drain_size, 7);
        assert_eq!(config.cache.categories.len(), 8);
        assert_eq!(config.cache.categories[0], CategoryConfig::new("romance", 7));
        assert!(config.cache.categories.iter().all(|c| c.start_offset == 7));
        assert_eq!(config.catalog.base_url, GOOGLE_BOOKS_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            [cache]
            drain_size = 3

            [[cache.categories]]
            name = "poetry"

            [[cache.categories]]
            name = "drama"
            start_offset = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.drain_size, 3);
        assert_eq!(config.cache.warm_limit, 7);
        assert_eq!(
            config.cache.categories,
            vec![CategoryConfig::new("poetry", 7), CategoryConfig::new("drama", 20)]
        );
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let result = Config::from_toml("[cache\nwarm_limit = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut config = Config::default();
        config.cache.categories.push(CategoryConfig::new("romance", 0));

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("romance"));
    }

    #[test]
    fn test_validate_rejects_empty_category_set() {
        let mut config = Config::default();
        config.cache.categories.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let mut config = Config::default();
        config.cache.warm_limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cache.drain_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_reads_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[cache]\nwarm_limit = 12\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.cache.warm_limit, 12);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("absent.toml");

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.cache, CacheConfig::default());
    }

    #[test]
    fn test_existing_file_only_when_present() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let absent = temp_dir.path().join("absent.toml");
        let present = temp_dir.path().join("config.toml");
        fs::write(&present, "").unwrap();

        assert_eq!(Config::existing_file(Some(&absent)), None);
        assert_eq!(Config::existing_file(Some(&present)), Some(present.clone()));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[cache]\ncategories = []\n").unwrap();

        assert!(matches!(Config::load(Some(&path)), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_has_category() {
        let config = Config::default();
        assert!(config.has_category("horror"));
        assert!(!config.has_category("cooking"));
    }
}
