//! core::config::schema
//!
//! Configuration schema types.
//!
//! The same schema is used for both scopes (global and repo); repo values
//! override global ones key by key.
//!
//! # Validation
//!
//! Config values are validated after parsing: directory names must be
//! single path components and must differ, and the similarity threshold
//! must be a percentage.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::SubdirName;

/// One configuration file.
///
/// # Example
///
/// ```toml
/// old_dir = "before"
/// new_dir = "after"
///
/// [diff]
/// renames = true
/// copies = false
/// rename_threshold = 50
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Name of the subdirectory holding pre-change files
    pub old_dir: Option<String>,

    /// Name of the subdirectory holding post-change files
    pub new_dir: Option<String>,

    /// Change enumeration settings
    pub diff: Option<DiffConfig>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in [&self.old_dir, &self.new_dir].into_iter().flatten() {
            SubdirName::new(name.as_str())
                .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        }

        if let (Some(old), Some(new)) = (&self.old_dir, &self.new_dir) {
            if old == new {
                return Err(ConfigError::InvalidValue(format!(
                    "old_dir and new_dir must differ (both '{}')",
                    old
                )));
            }
        }

        if let Some(diff) = &self.diff {
            diff.validate()?;
        }

        Ok(())
    }
}

/// Change enumeration settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DiffConfig {
    /// Detect renames (default: true)
    pub renames: Option<bool>,

    /// Detect copies from modified files (default: false)
    pub copies: Option<bool>,

    /// Similarity percentage for rename/copy detection (default: 50)
    pub rename_threshold: Option<u16>,
}

impl DiffConfig {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(threshold) = self.rename_threshold {
            if !(1..=100).contains(&threshold) {
                return Err(ConfigError::InvalidValue(format!(
                    "rename_threshold must be between 1 and 100, got {}",
                    threshold
                )));
            }
        }
        Ok(())
    }
}
