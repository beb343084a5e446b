//! Tool configuration
//!
//! Binary locations and the disk-space margin, resolved once at startup and
//! handed to every component. Loaded from an optional JSON file; any field
//! left out falls back to its default.
//!
//! ```json
//! {
//!   "probe_binary_path": "/usr/bin/ffprobe",
//!   "converter_binary_paths": { "mkvmerge": "/usr/bin/mkvmerge", "ffmpeg": "/usr/bin/ffmpeg" },
//!   "disk_space_margin": 1.2
//! }
//! ```

use crate::converter::{ConverterKind, ConverterSpec};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use shared_utils::disk_space::DEFAULT_SPACE_MARGIN;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PROBE_BINARY_NAME: &str = "ffprobe";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub probe_binary_path: PathBuf,
    pub converter_binary_paths: BTreeMap<ConverterKind, PathBuf>,
    pub disk_space_margin: f64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            probe_binary_path: default_binary_path(PROBE_BINARY_NAME),
            converter_binary_paths: ConverterKind::ALL
                .iter()
                .map(|kind| (*kind, default_binary_path(kind.binary_name())))
                .collect(),
            disk_space_margin: DEFAULT_SPACE_MARGIN,
        }
    }
}

/// `name` as found on `PATH`, else the conventional `/usr/bin/<name>`.
pub fn default_binary_path(name: &str) -> PathBuf {
    which::which(name).unwrap_or_else(|_| Path::new("/usr/bin").join(name))
}

impl ToolConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(config = ?config, "Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.disk_space_margin.is_finite() || self.disk_space_margin < 1.0 {
            return Err(ConfigError::InvalidMargin(self.disk_space_margin));
        }
        Ok(())
    }

    pub fn converter_path(&self, kind: ConverterKind) -> PathBuf {
        self.converter_binary_paths
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| default_binary_path(kind.binary_name()))
    }

    pub fn converter_spec(&self, kind: ConverterKind) -> ConverterSpec {
        ConverterSpec::new(kind, self.converter_path(kind))
    }

    pub fn with_probe(mut self, probe: impl Into<PathBuf>) -> Self {
        self.probe_binary_path = probe.into();
        self
    }

    pub fn with_converter(mut self, kind: ConverterKind, path: impl Into<PathBuf>) -> Self {
        self.converter_binary_paths.insert(kind, path.into());
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.disk_space_margin = margin;
        self
    }
}
