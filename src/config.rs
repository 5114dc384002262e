//! Run configuration shared by the reconciler and the obfuscator.
//!
//! Settings come from an optional YAML file in which every field may be omitted.
//! Command-line flags are layered on top by the caller.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ObfuscationError;

pub const DEFAULT_PROFILE_DIR: &str = "obfuscation_profiles";
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Overwrites a fixed character range of values whose field name contains `pattern`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentifierMask {
    pub pattern: String,
    pub start: usize,
    pub end: usize,
    pub marker: String,
}

impl IdentifierMask {
    pub fn new(pattern: &str, start: usize, end: usize, marker: &str) -> Self {
        Self {
            pattern: pattern.to_ascii_lowercase(),
            start,
            end,
            marker: marker.to_string(),
        }
    }

    /// Case-insensitive substring test against a field name.
    pub fn matches(&self, field_name: &str) -> bool {
        field_name
            .to_ascii_lowercase()
            .contains(&self.pattern.to_ascii_lowercase())
    }

    /// Replaces characters `start..end` (clamped to the value length) with the marker.
    pub fn apply(&self, value: &str) -> String {
        let chars = value.chars().collect::<Vec<_>>();
        if self.start >= chars.len() {
            return value.to_string();
        }
        let end = self.end.min(chars.len());
        let mut masked = String::with_capacity(value.len() + self.marker.len());
        masked.extend(&chars[..self.start]);
        masked.push_str(&self.marker);
        masked.extend(&chars[end..]);
        masked
    }
}

fn default_profile_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PROFILE_DIR)
}

fn default_preview_rows() -> usize {
    DEFAULT_PREVIEW_ROWS
}

fn default_identifier_masks() -> Vec<IdentifierMask> {
    vec![
        IdentifierMask::new("hicn", 0, 3, "MAX"),
        IdentifierMask::new("mbi", 4, 6, "TE"),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObfuscatorConfig {
    #[serde(default = "default_profile_dir")]
    pub profile_dir: PathBuf,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    #[serde(default = "default_identifier_masks")]
    pub identifier_masks: Vec<IdentifierMask>,
}

impl Default for ObfuscatorConfig {
    fn default() -> Self {
        Self {
            profile_dir: default_profile_dir(),
            preview_rows: default_preview_rows(),
            identifier_masks: default_identifier_masks(),
        }
    }
}

impl ObfuscatorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let reader = BufReader::new(file);
        let config: ObfuscatorConfig =
            serde_yaml::from_reader(reader).context("Parsing config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ObfuscationError> {
        for mask in &self.identifier_masks {
            if mask.pattern.trim().is_empty() {
                return Err(ObfuscationError::Config(
                    "identifier mask pattern cannot be empty".to_string(),
                ));
            }
            if mask.start >= mask.end {
                return Err(ObfuscationError::Config(format!(
                    "identifier mask '{}' has an empty range {}..{}",
                    mask.pattern, mask.start, mask.end
                )));
            }
        }
        Ok(())
    }
}
