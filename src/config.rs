use crate::error::ConfigError;
use crate::filter::SuppressRules;
use crate::source::{LabelTables, SourceId};
use crate::suppress::DEFAULT_IOU_THRESHOLD;
use crate::taxonomy::ClassMapping;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Read-only fusion configuration, built once at startup and shared by
/// reference with every fusion call.
///
/// Each section falls back to its defaults when missing from the file. A
/// section that is present replaces the defaults wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FusionConfig {
    #[serde(default)]
    pub fusion: FusionSettings,
    #[serde(default)]
    pub labels: LabelTables,
    #[serde(default)]
    pub mapping: ClassMapping,
    #[serde(default)]
    pub suppress: SuppressRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionSettings {
    pub iou_threshold: f32,
}

impl Default for FusionSettings {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        }
    }
}

impl FusionConfig {
    /// Load from an explicit path, or from the default location if one
    /// exists there, or fall back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::config_file_path() {
                Some(default_path) if default_path.is_file() => Self::from_file(&default_path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.fusion.iou_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::InvalidThreshold(threshold));
        }
        for source in SourceId::ALL {
            if self.labels.table(source).is_empty() {
                return Err(ConfigError::EmptyLabelTable(source));
            }
        }
        Ok(())
    }

    pub fn with_iou_threshold(mut self, threshold: f32) -> Result<Self, ConfigError> {
        self.fusion.iou_threshold = threshold;
        self.validate()?;
        Ok(self)
    }

    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("dms-fusion");
            path.push("config.toml");
            path
        })
    }
}
