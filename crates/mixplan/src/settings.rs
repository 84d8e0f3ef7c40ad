//! YAML settings file
//!
//! Every section is optional; missing sections and fields fall back to the
//! library defaults.
//!
//! ```yaml
//! attribution:
//!   alpha: 0.5
//!   bootstrap_count: 200
//!   seed: 7
//! optimization:
//!   max_iterations: 500
//! forecast:
//!   interval_z: 1.64
//! ```

use std::path::Path;

use color_eyre::eyre::WrapErr;
use mixplan_core::{AttributionConfig, ForecastConfig, OptimizationConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub attribution: AttributionConfig,
    #[serde(default)]
    pub optimization: OptimizationConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
}

impl Settings {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    /// Save to YAML string
    pub fn to_yaml(&self) -> Result<String, serde_saphyr::ser::Error> {
        serde_saphyr::to_string(self)
    }

    /// Read settings from `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> color_eyre::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read settings from {}", path.display()))?;
        let settings = Self::from_yaml(&content)
            .wrap_err_with(|| format!("invalid settings file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }
}
