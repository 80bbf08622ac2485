//! Project configuration (fpp.toml) parsing and types.

use std::fs;
use std::path::Path;

use fpp_translate::TranslateConfig;
use serde::Deserialize;
use tracing::warn;

pub const CONFIG_FILE: &str = "fpp.toml";

/// Root configuration structure for fpp.toml.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// AST dumps or directories of dumps, used when none are given on the
    /// command line.
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub output: OutputConfig,
    /// Everything the translator itself consumes.
    #[serde(default)]
    pub translate: TranslateConfig,
}

/// Output section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputConfig {
    /// Directory receiving one file per declaration.
    pub dir: Option<String>,
    /// Single file receiving every declaration.
    pub combined: Option<String>,
}

impl ProjectConfig {
    /// Load fpp.toml from the current directory.
    /// Returns None if the file doesn't exist.
    pub fn load() -> Option<Self> {
        Self::load_from_path(Path::new(CONFIG_FILE))
    }

    /// Load configuration from a specific path.
    /// An unreadable or malformed file is logged and treated as missing.
    pub fn load_from_path(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read configuration, using defaults");
                return None;
            }
        };
        match Self::parse(&content) {
            Ok(config) => Some(config),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "invalid configuration, using defaults");
                None
            }
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration or return default if not found.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

impl OutputConfig {
    /// Get the output directory, defaulting to "output".
    pub fn dir(&self) -> &str {
        self.dir.as_deref().unwrap_or("output")
    }
}
