//! Sorting and filtering configuration.
//!
//! Configuration is read from TOML:
//!
//! ```toml
//! [sort]
//! day_boundary_hour = 4
//! jobs = 1
//!
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["*.part"]
//! regex = ["^~\\$"]
//! ```
//!
//! Every section and key is optional.

use crate::bucket::DEFAULT_DAY_BOUNDARY_HOUR;
use crate::mover::HISTORY_FILE_NAME;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE_NAME: &str = ".datesortrc.toml";

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Invalid glob pattern '{0}'")]
    InvalidGlobPattern(String),

    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    #[error("IO error reading configuration: {0}")]
    IoError(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SorterConfig {
    #[serde(default)]
    pub sort: SortSettings,
    #[serde(default)]
    pub filters: FilterRules,
}

/// How files are bucketed and processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortSettings {
    /// Files created before this hour belong to the previous day.
    #[serde(default = "default_day_boundary_hour")]
    pub day_boundary_hour: u32,

    /// Number of worker threads; 1 processes files sequentially.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

fn default_day_boundary_hour() -> u32 {
    DEFAULT_DAY_BOUNDARY_HOUR
}

fn default_jobs() -> usize {
    1
}

impl Default for SortSettings {
    fn default() -> Self {
        Self {
            day_boundary_hour: default_day_boundary_hour(),
            jobs: default_jobs(),
        }
    }
}

/// Which files are left alone regardless of their type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Sort files whose name starts with a dot. Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,
}

fn default_enable_hidden_files() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names.
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the file name.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Regular expressions matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

impl SorterConfig {
    /// Loads configuration, falling back through these locations:
    ///
    /// 1. `config_path`, if given (must exist)
    /// 2. `.datesortrc.toml` in `working_dir`
    /// 3. `~/.config/datesort/config.toml`
    /// 4. built-in defaults
    pub fn load(config_path: Option<&Path>, working_dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = working_dir.join(LOCAL_CONFIG_FILE_NAME);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("datesort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sort.day_boundary_hour > 23 {
            return Err(ConfigError::ConfigInvalid(format!(
                "day_boundary_hour must be between 0 and 23, got {}",
                self.sort.day_boundary_hour
            )));
        }
        if self.sort.jobs == 0 {
            return Err(ConfigError::ConfigInvalid(
                "jobs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Filter rules with their patterns compiled once up front.
#[derive(Debug)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
}

impl CompiledFilters {
    /// Compiles `rules`.
    ///
    /// The history and local configuration files are always excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex pattern is invalid.
    pub fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude
            .patterns
            .iter()
            .map(|p| Pattern::new(p).map_err(|_| ConfigError::InvalidGlobPattern(p.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut exclude_filenames: HashSet<String> =
            rules.exclude.filenames.iter().cloned().collect();
        exclude_filenames.insert(HISTORY_FILE_NAME.to_string());
        exclude_filenames.insert(LOCAL_CONFIG_FILE_NAME.to_string());

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames,
            exclude_patterns,
            exclude_regexes,
        })
    }

    /// Returns true if the file may be considered for sorting.
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.exclude_filenames.contains(&*file_name) {
            return false;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_patterns.iter().any(|p| p.matches(&file_name)) {
            return false;
        }

        !self.exclude_regexes.iter().any(|r| r.is_match(&file_name))
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude_filenames: [HISTORY_FILE_NAME, LOCAL_CONFIG_FILE_NAME]
                .into_iter()
                .map(String::from)
                .collect(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
        }
    }
}
