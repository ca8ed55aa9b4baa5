use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    analysis::types::AnalysisConfig,
    error::{ConfigError, Result, RpmError},
    report::table::{Precision, MAX_DECIMALS},
};

/// Plot dimensions accepted by [`PlotConfig::validate`]
const PLOT_WIDTH_RANGE: std::ops::RangeInclusive<u32> = 200..=8000;
const PLOT_HEIGHT_RANGE: std::ops::RangeInclusive<u32> = 150..=8000;

/// Main configuration for turntable-rpm
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Peak selection settings
    pub analysis: AnalysisConfig,

    /// Statistics table settings
    pub report: ReportConfig,

    /// Interval plot settings
    pub plot: PlotConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => RpmError::Config(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }),
            _ => RpmError::Io(e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            reason: e.message().to_string(),
        })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        self.report.validate()?;
        self.plot.validate()?;
        Ok(())
    }
}

/// Statistics table configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Decimals printed in every cell
    pub precision: Precision,
}

impl ReportConfig {
    fn validate(&self) -> Result<()> {
        if let Precision::Fixed(decimals) = self.precision {
            if decimals > MAX_DECIMALS {
                return Err(ConfigError::InvalidValue {
                    key: "report.precision".to_string(),
                    value: decimals.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Interval plot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Save a plot after a successful measurement
    pub enabled: bool,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Title drawn above the chart
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Where to write the PNG, defaults to `<stem>_RPM_Analysis_Plot.png`
    /// next to the input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            width: 1600,
            height: 800,
            title: None,
            output: None,
        }
    }
}

impl PlotConfig {
    fn validate(&self) -> Result<()> {
        if !PLOT_WIDTH_RANGE.contains(&self.width) || !PLOT_HEIGHT_RANGE.contains(&self.height) {
            return Err(ConfigError::InvalidValue {
                key: "plot.size".to_string(),
                value: format!("{}x{}", self.width, self.height),
            }
            .into());
        }
        Ok(())
    }
}
