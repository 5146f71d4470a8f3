//! TOML-based viewer configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::compare::DEFAULT_TOLERANCE;
use crate::palette::{Palette, is_hex_color};

/// Top-level viewer configuration parsed from TOML.
///
/// Every section is optional and falls back to its defaults. Load from
/// TOML with [`ViewerConfig::from_toml_file`] or use
/// [`ViewerConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewerConfig {
    /// Where project folders live.
    #[serde(default)]
    pub projects: ProjectsConfig,
    /// Project comparison settings.
    #[serde(default)]
    pub compare: CompareConfig,
    /// Colors and patterns handed to renderers.
    #[serde(default)]
    pub palette: Palette,
}

/// Project discovery settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectsConfig {
    /// Directory whose sub-directories are projects.
    pub root: PathBuf,
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("projects"),
        }
    }
}

/// Project comparison settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareConfig {
    /// Absolute tolerance below which two values are equal.
    pub tolerance: f64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"compare.tolerance"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ViewerConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.projects.root.as_os_str().is_empty() {
            errors.push(ConfigError::new("projects.root", "must not be empty"));
        }

        let tol = self.compare.tolerance;
        if !tol.is_finite() || tol < 0.0 {
            errors.push(ConfigError::new(
                "compare.tolerance",
                format!("must be finite and >= 0, got {tol}"),
            ));
        }

        let p = &self.palette;
        for (name, value) in p.colors() {
            if !is_hex_color(value) {
                errors.push(ConfigError::new(
                    format!("palette.{name}"),
                    format!("must be a #RRGGBB color, got \"{value}\""),
                ));
            }
        }
        for (name, alpha) in [("band_alpha", p.band_alpha), ("reserve_alpha", p.reserve_alpha)] {
            if !(0.0..=1.0).contains(&alpha) {
                errors.push(ConfigError::new(
                    format!("palette.{name}"),
                    "must be in [0.0, 1.0]",
                ));
            }
        }

        errors
    }
}
