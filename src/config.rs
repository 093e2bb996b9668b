use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::sampling::SamplingMode;

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "rusty-eda.json";
/// Overrides the config file location.
pub const CONFIG_ENV: &str = "RUSTY_EDA_CONFIG";
/// Overrides `max_points`.
pub const MAX_POINTS_ENV: &str = "RUSTY_EDA_MAX_POINTS";

/// Where the dashboard's data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Sample,
    Upload,
}

impl DataSource {
    pub fn label(self) -> &'static str {
        match self {
            DataSource::Sample => "Sample Iris Dataset",
            DataSource::Upload => "Upload CSV",
        }
    }
}

/// User-tunable dashboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Row cap for plotted charts; 0 disables the cap.
    pub max_points: usize,
    /// Rows shown in the preview table.
    pub preview_rows: usize,
    /// Histogram bin count; 0 picks one automatically.
    pub histogram_bins: usize,
    pub sampling: SamplingMode,
    pub default_source: DataSource,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            max_points: 8000,
            preview_rows: 10,
            histogram_bins: 0,
            sampling: SamplingMode::Head,
            default_source: DataSource::Sample,
        }
    }
}

impl DashboardConfig {
    /// Parse a config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the config from the environment and working directory.
    ///
    /// A missing file gives defaults; a broken one is logged and ignored.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        let config = Self::load_or_default(&path);
        config.with_max_points_override(std::env::var(MAX_POINTS_ENV).ok().as_deref())
    }

    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::from_path(path) {
            Ok(config) => {
                log::info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("ignoring config: {e:#}");
                Self::default()
            }
        }
    }

    /// Apply a `max_points` override given as text; unparsable values are ignored.
    pub fn with_max_points_override(mut self, raw: Option<&str>) -> Self {
        if let Some(raw) = raw {
            match raw.trim().parse::<usize>() {
                Ok(n) => self.max_points = n,
                Err(_) => log::warn!("{MAX_POINTS_ENV}={raw:?} is not a row count, ignoring"),
            }
        }
        self
    }
}
