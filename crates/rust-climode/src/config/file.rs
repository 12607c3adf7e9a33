//! File-based configuration loading.
//!
//! A driver profile bundles the engine settings with the mode registry of
//! one device type. Profiles are TOML or JSON; the format follows the file
//! extension.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::EngineConfig;
use crate::error::{CliError, Result};
use crate::mode::{Mode, ModeRegistry};

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Detect format from path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProfile {
    #[serde(default)]
    engine: EngineConfig,
    modes: BTreeMap<String, Mode>,
}

/// Engine settings plus the validated mode registry of a device type.
#[derive(Debug, Clone)]
pub struct DriverProfile {
    /// Engine settings.
    pub engine: EngineConfig,
    /// Validated modes.
    pub modes: ModeRegistry,
}

impl DriverProfile {
    /// Parse a profile from text in the given format.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let raw: RawProfile = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Ok(Self {
            engine: raw.engine,
            modes: ModeRegistry::new(raw.modes)?,
        })
    }

    /// Load a profile file, detecting the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            CliError::config(format!("unknown profile format: {}", path.display()))
        })?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::io_context(format!("reading {}", path.display()), e))?;
        Self::parse(&content, format)
    }
}

/// Finds driver profiles by device type name.
#[derive(Debug, Default)]
pub struct ProfileLoader {
    /// Search paths.
    search_paths: Vec<PathBuf>,
}

impl ProfileLoader {
    /// Create a new loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a search path.
    #[must_use]
    pub fn add_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Find a profile file.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        for search_path in &self.search_paths {
            let path = search_path.join(name);
            if path.is_file() {
                return Some(path);
            }

            for ext in ["toml", "json"] {
                let path = search_path.join(format!("{name}.{ext}"));
                if path.is_file() {
                    return Some(path);
                }
            }
        }

        None
    }

    /// Load by name (searches paths).
    pub fn load_by_name(&self, name: &str) -> Result<DriverProfile> {
        let path = self
            .find(name)
            .ok_or_else(|| CliError::config(format!("profile not found: {name}")))?;
        DriverProfile::load(path)
    }
}
