use crate::error::{ReconError, Result};
use serde::{Deserialize, Serialize};
use signin_recon_common::{ConfidenceBands, MatcherOptions, DEFAULT_NAME_MATCH_THRESHOLD};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const THRESHOLD_ENV: &str = "SIGNIN_RECON_THRESHOLD";
pub const DIRECTORY_ENV: &str = "SIGNIN_RECON_DIRECTORY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum similarity to accept a name match
    pub name_match_threshold: f64,
    /// Confidence counted as a valid sign-in
    pub valid_confidence: f64,
    /// Confidence counted as high
    pub high_confidence: f64,
    /// Match rows in parallel
    pub parallel: bool,
    pub directory: DirectoryConfig,
}

/// Where the reference directory comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Exported directory file (.json / .csv / .xlsx)
    pub source: Option<PathBuf>,
    /// Table the export was taken from (reported only)
    pub table_name: String,
    /// Partition key prefix of profile items in a DynamoDB export
    pub partition_prefix: String,
    /// Sort key of profile items in a DynamoDB export
    pub profile_sort_key: String,
    /// Worksheet to read from a spreadsheet; first sheet when unset
    pub sheet: Option<String>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            source: None,
            table_name: "signins".into(),
            partition_prefix: "EMP#".into(),
            profile_sort_key: "PROFILE".into(),
            sheet: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name_match_threshold: DEFAULT_NAME_MATCH_THRESHOLD,
            valid_confidence: 0.90,
            high_confidence: 0.80,
            parallel: true,
            directory: DirectoryConfig::default(),
        }
    }
}

impl Config {
    /// Saved config with environment overrides applied
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config = Self::read_from(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Saved values for `config` edits
    ///
    /// No environment overrides and no range checks, so a bad value can be
    /// overwritten. An unreadable file falls back to the defaults.
    pub fn load_for_edit(path: &Path) -> Self {
        Self::read_from(path).unwrap_or_else(|e| {
            warn!("ignoring unusable config {}: {}", path.display(), e);
            Self::default()
        })
    }

    fn read_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReconError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("signin-recon").join("config.json"))
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var(THRESHOLD_ENV) {
            self.name_match_threshold = value.trim().parse().map_err(|_| {
                ReconError::Config(format!("{} is not a number: {}", THRESHOLD_ENV, value))
            })?;
        }
        if let Ok(path) = std::env::var(DIRECTORY_ENV) {
            if !path.trim().is_empty() {
                self.directory.source = Some(PathBuf::from(path));
            }
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("name_match_threshold", self.name_match_threshold),
            ("valid_confidence", self.valid_confidence),
            ("high_confidence", self.high_confidence),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ReconError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    key, value
                )));
            }
        }
        Ok(())
    }

    pub fn set_threshold(&mut self, threshold: f64) -> Result<()> {
        self.name_match_threshold = threshold;
        self.validate()?;
        self.save()
    }

    pub fn set_directory(&mut self, path: PathBuf) -> Result<()> {
        self.directory.source = Some(path);
        self.save()
    }

    pub fn matcher_options(&self) -> MatcherOptions {
        MatcherOptions {
            name_match_threshold: self.name_match_threshold,
            parallel: self.parallel,
        }
    }

    pub fn bands(&self) -> ConfidenceBands {
        ConfidenceBands {
            valid: self.valid_confidence,
            high: self.high_confidence,
        }
    }
}
