//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! oldnew has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$OLDNEW_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/oldnew/config.toml`
//! 3. `~/.oldnew/config.toml`
//!
//! # Repo Config Location
//!
//! `<git-dir>/oldnew/config.toml`. The repo scope is layered on after the
//! repository has been opened, since the git dir is only known then.
//!
//! # Example
//!
//! ```no_run
//! use oldnew::core::config::Config;
//! use std::path::Path;
//!
//! let mut config = Config::load_global().unwrap();
//! config.load_repo(Path::new("/path/to/repo/.git")).unwrap();
//!
//! println!("old tree: {}", config.old_dir());
//! println!("renames: {}", config.renames());
//! ```

pub mod schema;

pub use schema::{ConfigFile, DiffConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{SubdirName, SubdirNames};

/// Default similarity percentage for rename/copy detection.
pub const DEFAULT_RENAME_THRESHOLD: u16 = 50;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Merged configuration from all sources.
///
/// Accessor methods apply precedence rules: repo config overrides global
/// config, which overrides built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: ConfigFile,
    /// Repository configuration (if a repo config file was found)
    pub repo: Option<ConfigFile>,
    global_path: Option<PathBuf>,
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load global configuration from the standard locations.
    ///
    /// Missing config files are not an error (defaults are used).
    pub fn load_global() -> Result<Self, ConfigError> {
        match Self::find_global() {
            Some(path) => Self::load_global_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load global configuration from an explicit file.
    pub fn load_global_file(path: &Path) -> Result<Self, ConfigError> {
        let global = Self::read_config(path)?;
        global.validate()?;
        Ok(Self {
            global,
            global_path: Some(path.to_path_buf()),
            ..Self::default()
        })
    }

    /// Layer the repo config found under `git_dir` on top of this config.
    ///
    /// Returns whether a repo config file was found.
    pub fn load_repo(&mut self, git_dir: &Path) -> Result<bool, ConfigError> {
        let path = Self::repo_config_path(git_dir);
        if !path.exists() {
            return Ok(false);
        }

        let repo = Self::read_config(&path)?;
        repo.validate()?;
        self.repo = Some(repo);
        self.repo_path = Some(path);
        Ok(true)
    }

    fn find_global() -> Option<PathBuf> {
        // 1. Check $OLDNEW_CONFIG
        if let Ok(path) = std::env::var("OLDNEW_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/oldnew/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("oldnew/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.oldnew/config.toml
        dirs::home_dir()
            .map(|home| home.join(".oldnew/config.toml"))
            .filter(|path| path.exists())
    }

    fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Path of the repo config file for a git dir.
    pub fn repo_config_path(git_dir: &Path) -> PathBuf {
        git_dir.join("oldnew/config.toml")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    fn layered<'a, T>(&'a self, get: impl Fn(&'a ConfigFile) -> Option<T>) -> Option<T> {
        self.repo.as_ref().and_then(&get).or_else(|| get(&self.global))
    }

    fn layered_diff<'a, T>(&'a self, get: impl Fn(&'a DiffConfig) -> Option<T>) -> Option<T> {
        self.layered(|file| file.diff.as_ref().and_then(&get))
    }

    /// Name of the subdirectory holding pre-change files.
    ///
    /// Defaults to "old".
    pub fn old_dir(&self) -> &str {
        self.layered(|f| f.old_dir.as_deref()).unwrap_or("old")
    }

    /// Name of the subdirectory holding post-change files.
    ///
    /// Defaults to "new".
    pub fn new_dir(&self) -> &str {
        self.layered(|f| f.new_dir.as_deref()).unwrap_or("new")
    }

    /// Whether rename detection is enabled. Defaults to `true`.
    pub fn renames(&self) -> bool {
        self.layered_diff(|d| d.renames).unwrap_or(true)
    }

    /// Whether copy detection is enabled. Defaults to `false`.
    pub fn copies(&self) -> bool {
        self.layered_diff(|d| d.copies).unwrap_or(false)
    }

    /// Similarity percentage for rename/copy detection.
    pub fn rename_threshold(&self) -> u16 {
        self.layered_diff(|d| d.rename_threshold)
            .unwrap_or(DEFAULT_RENAME_THRESHOLD)
    }

    /// Validated subdirectory names, with optional per-run overrides.
    pub fn subdir_names(
        &self,
        old_override: Option<&str>,
        new_override: Option<&str>,
    ) -> Result<SubdirNames, crate::core::types::TypeError> {
        let old = SubdirName::new(old_override.unwrap_or(self.old_dir()))?;
        let new = SubdirName::new(new_override.unwrap_or(self.new_dir()))?;
        SubdirNames::new(old, new)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_repo_config(git_dir: &Path, contents: &str) {
        let path = Config::repo_config_path(git_dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.old_dir(), "old");
        assert_eq!(config.new_dir(), "new");
        assert!(config.renames());
        assert!(!config.copies());
        assert_eq!(config.rename_threshold(), DEFAULT_RENAME_THRESHOLD);
    }

    #[test]
    fn load_global_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "old_dir = \"a\"\n[diff]\ncopies = true\n").unwrap();

        let config = Config::load_global_file(&path).unwrap();
        assert_eq!(config.old_dir(), "a");
        assert!(config.copies());
        assert_eq!(config.global_config_loaded_from(), Some(path.as_path()));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "old_dir = [").unwrap();

        let err = Config::load_global_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn missing_repo_config_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        assert!(!config.load_repo(temp.path()).unwrap());
        assert!(config.repo.is_none());
        assert!(config.repo_config_loaded_from().is_none());
    }

    #[test]
    fn repo_overrides_global() {
        let temp = TempDir::new().unwrap();
        write_repo_config(temp.path(), "new_dir = \"after\"\n[diff]\nrenames = false\n");

        let mut config = Config {
            global: ConfigFile {
                old_dir: Some("before".into()),
                new_dir: Some("global-new".into()),
                diff: Some(DiffConfig {
                    renames: Some(true),
                    rename_threshold: Some(80),
                    ..Default::default()
                }),
            },
            ..Default::default()
        };
        assert!(config.load_repo(temp.path()).unwrap());
        assert_eq!(
            config.repo_config_loaded_from(),
            Some(Config::repo_config_path(temp.path()).as_path())
        );

        assert_eq!(config.old_dir(), "before");
        assert_eq!(config.new_dir(), "after");
        assert!(!config.renames());
        // Not set in repo scope, falls through to global
        assert_eq!(config.rename_threshold(), 80);
    }

    #[test]
    fn invalid_repo_config_rejected() {
        let temp = TempDir::new().unwrap();
        write_repo_config(temp.path(), "old_dir = \"../escape\"");

        let mut config = Config::default();
        assert!(matches!(
            config.load_repo(temp.path()),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn overrides_win_for_subdir_names() {
        let config = Config::default();
        let names = config.subdir_names(Some("a"), None).unwrap();
        assert_eq!(names.get(crate::core::types::Side::Old).as_str(), "a");
        assert_eq!(names.get(crate::core::types::Side::New).as_str(), "new");

        assert!(config.subdir_names(Some("new"), None).is_err());
    }
}
