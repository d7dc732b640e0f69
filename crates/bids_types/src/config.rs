//! Configuration types for the fixup tools

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::naming::NamingScheme;

/// Built-in naming schemes selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemePreset {
    Corrected,
    Initial,
}

impl SchemePreset {
    pub fn scheme(self) -> NamingScheme {
        match self {
            SchemePreset::Corrected => NamingScheme::corrected(),
            SchemePreset::Initial => NamingScheme::initial(),
        }
    }
}

/// Either a preset name or a fully spelled-out scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemeSetting {
    Preset(SchemePreset),
    Custom(NamingScheme),
}

impl Default for SchemeSetting {
    fn default() -> Self {
        SchemeSetting::Preset(SchemePreset::Corrected)
    }
}

impl SchemeSetting {
    pub fn resolve(&self) -> NamingScheme {
        match self {
            SchemeSetting::Preset(preset) => preset.scheme(),
            SchemeSetting::Custom(scheme) => scheme.clone(),
        }
    }
}

/// Where recreated file names come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameSource {
    /// Computed from the naming scheme
    #[default]
    Scheme,
    /// Read from each subject's `.vhdr`
    Header,
}

/// Configuration for a fixup run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixupConfig {
    /// BIDS task label of the source recordings
    #[serde(default = "default_task")]
    pub task: String,
    /// Subject to legacy-name mapping
    #[serde(default)]
    pub scheme: SchemeSetting,
    /// Source of recreated names
    #[serde(default)]
    pub names: NameSource,
    /// Copy access and modification times along with the bytes
    #[serde(default = "default_preserve_times")]
    pub preserve_times: bool,
    /// Overrides the patterns derived from the scheme during cleanup
    #[serde(default)]
    pub cleanup_patterns: Option<Vec<String>>,
}

fn default_task() -> String {
    "visualoddball".to_string()
}

fn default_preserve_times() -> bool {
    true
}

impl Default for FixupConfig {
    fn default() -> Self {
        Self {
            task: default_task(),
            scheme: SchemeSetting::default(),
            names: NameSource::default(),
            preserve_times: default_preserve_times(),
            cleanup_patterns: None,
        }
    }
}

impl FixupConfig {
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: FixupConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.task.is_empty() || self.task.contains(['/', '\\', '*', '?', '[']) {
            return Err(ConfigError::InvalidScheme {
                message: format!("task label '{}' is not valid", self.task),
            });
        }
        if let Some(patterns) = &self.cleanup_patterns {
            if patterns.iter().any(|p| p.is_empty() || p.contains("..")) {
                return Err(ConfigError::InvalidScheme {
                    message: "cleanup patterns must be non-empty and stay inside the dataset"
                        .to_string(),
                });
            }
        }
        self.naming_scheme().validate()
    }

    pub fn naming_scheme(&self) -> NamingScheme {
        self.scheme.resolve()
    }

    pub fn effective_cleanup_patterns(&self) -> Vec<String> {
        self.cleanup_patterns
            .clone()
            .unwrap_or_else(|| self.naming_scheme().cleanup_patterns())
    }

    /// File name pattern of the BIDS source recording for `ext`.
    pub fn source_pattern(&self, ext: &str) -> String {
        format!("*_task-{}_eeg.{}", self.task, ext)
    }
}
