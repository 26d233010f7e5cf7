//! Exclusion rules and naming limits.
//!
//! A fixed block list of file names always applies. On top of it, an optional
//! TOML configuration file can exclude more entries and tune how many numbered
//! variants are probed when a destination is taken.
//!
//! # Configuration File Format
//!
//! ```toml
//! [filters.exclude]
//! filenames = [".DS_Store"]
//! patterns = ["raw/**", "*.part"]
//! regex = ["^~\\$"]
//!
//! [naming]
//! max_attempts = 63
//! ```

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::unique_name::DEFAULT_MAX_ATTEMPTS;

/// File names that are never touched, wherever they appear. Case-sensitive.
pub const BLOCKLIST: [&str; 2] = ["thumbs.db", "desktop.ini"];

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_NAME: &str = ".sorterarc.toml";

/// Errors that can occur during configuration loading and compilation.
#[derive(thiserror::Error, Debug, Clone)]
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

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SorteraConfig {
    #[serde(default)]
    pub filters: FilterRules,

    #[serde(default)]
    pub naming: NamingRules,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    #[serde(default)]
    pub exclude: ExcludeRules,
}

/// Entries excluded in addition to the fixed block list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact base names.
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the path relative to the root.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Regex patterns matched against the base name.
    #[serde(default)]
    pub regex: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingRules {
    /// How many numbered variants (`name.ext_1`, `name.ext_2`, ...) to try
    /// before giving up on a destination.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

impl SorteraConfig {
    /// Load configuration, falling back to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if given
    /// 2. `.sorterarc.toml` in the directory being organized
    /// 3. `~/.config/sortera/config.toml`
    /// 4. Built-in defaults
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file is missing, or if any
    /// file found cannot be read or parsed.
    pub fn load(config_path: Option<&Path>, root: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = root.join(LOCAL_CONFIG_NAME);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sortera")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;

        if config.naming.max_attempts == 0 {
            return Err(ConfigError::ConfigInvalid(
                "naming.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    /// Compile the exclusion rules for matching.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex pattern is invalid.
    pub fn compile(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters.exclude)
    }
}

/// Pre-compiled exclusion rules.
#[derive(Debug)]
pub struct CompiledFilters {
    exclude_filenames: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
}

impl CompiledFilters {
    fn new(rules: &ExcludeRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = rules
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_filenames = BLOCKLIST
            .iter()
            .map(|name| name.to_string())
            .chain(std::iter::once(LOCAL_CONFIG_NAME.to_string()))
            .chain(rules.filenames.iter().cloned())
            .collect();

        Ok(Self {
            exclude_filenames,
            exclude_patterns,
            exclude_regexes,
        })
    }

    /// Check whether an entry, given by its path relative to the root, is
    /// excluded from processing.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        let file_name = relative
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        self.exclude_filenames.contains(file_name.as_ref())
            || self
                .exclude_patterns
                .iter()
                .any(|pattern| pattern.matches_path(relative))
            || self
                .exclude_regexes
                .iter()
                .any(|regex| regex.is_match(&file_name))
    }
}
