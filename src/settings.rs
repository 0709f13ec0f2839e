//! Persistent command-line settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::bvh::BuildParams;
use crate::util::Result;

/// Settings read by the `flatbvh` binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Builder constants
    pub build: BuildParams,

    /// Run structural validation after every build
    pub validate: bool,

    /// `tracing` filter directive; the `FLATBVH_LOG` env var wins over this
    pub log_filter: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            build: BuildParams::default(),
            validate: true,
            log_filter: None,
        }
    }
}

impl Settings {
    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("flatbvh");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::default_path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Load settings from an explicit file; a missing or malformed file is an error
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&text)?;
        settings.build.validate()?;
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
