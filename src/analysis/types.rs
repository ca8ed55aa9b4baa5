use serde::{Deserialize, Serialize};

use crate::analysis::peaks::PeakSelection;
use crate::analysis::stats::{IntervalSeries, StatsRecord};
use crate::audio::types::ChannelMode;
use crate::error::{ConfigError, Result};

/// Configuration for one RPM measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Which channel(s) of the recording to analyse
    pub channel_mode: ChannelMode,

    /// Number of ticks to locate; one more than the revolutions measured
    pub num_peaks: usize,

    /// Minimum spacing between ticks in milliseconds
    pub min_distance_ms: u32,

    /// Amplitude a local maximum must reach to count as a tick.
    /// 0.0 assumes audio without DC offset.
    pub height_threshold: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            channel_mode: ChannelMode::Mix,
            num_peaks: 11,
            min_distance_ms: 1300,
            height_threshold: 0.0,
        }
    }
}

impl AnalysisConfig {
    /// Build a config from raw command-line integers, rejecting
    /// non-positive peak counts and negative distances.
    pub fn from_raw(num_peaks: i64, min_distance_ms: i64) -> Result<Self> {
        if num_peaks <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "num_peaks".to_string(),
                value: num_peaks.to_string(),
            }
            .into());
        }

        let min_distance_ms = u32::try_from(min_distance_ms).map_err(|_| ConfigError::InvalidValue {
            key: "min_distance_ms".to_string(),
            value: min_distance_ms.to_string(),
        })?;

        let num_peaks = usize::try_from(num_peaks).map_err(|_| ConfigError::InvalidValue {
            key: "num_peaks".to_string(),
            value: num_peaks.to_string(),
        })?;

        Ok(Self {
            num_peaks,
            min_distance_ms,
            ..Default::default()
        })
    }

    /// Revolutions covered by `num_peaks` ticks
    pub fn revolutions(&self) -> usize {
        self.num_peaks.saturating_sub(1)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.num_peaks == 0 {
            return Err(ConfigError::InvalidValue {
                key: "analysis.num_peaks".to_string(),
                value: self.num_peaks.to_string(),
            }
            .into());
        }

        if !self.height_threshold.is_finite() {
            return Err(ConfigError::InvalidValue {
                key: "analysis.height_threshold".to_string(),
                value: self.height_threshold.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// A completed measurement
#[derive(Debug, Clone)]
pub struct RpmAnalysis {
    /// Ticks used for the measurement, chronological
    pub peaks: PeakSelection,

    /// Revolution times and per-revolution RPM
    pub series: IntervalSeries,

    /// Summary statistics over `series`
    pub stats: StatsRecord,

    /// Configuration the measurement was taken with
    pub config: AnalysisConfig,

    /// Separation actually enforced, after conversion from milliseconds
    pub min_distance_samples: usize,
}

impl RpmAnalysis {
    pub fn revolutions(&self) -> usize {
        self.series.len()
    }
}

/// Result of running the pipeline on a recording
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    /// Every requested peak was found and statistics were computed
    Measured(RpmAnalysis),

    /// The recording has fewer qualifying peaks than requested
    InsufficientPeaks { expected: usize, found: usize },

    /// Only one peak was requested, so there is no interval to measure
    NoIntervals { found: usize },
}

impl AnalysisOutcome {
    pub fn analysis(&self) -> Option<&RpmAnalysis> {
        match self {
            Self::Measured(analysis) => Some(analysis),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RpmError;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
        assert_eq!(AnalysisConfig::default().revolutions(), 10);
    }

    #[test]
    fn test_from_raw_rejects_bad_values() {
        for (peaks, distance) in [(0, 1300), (-4, 1300), (11, -1)] {
            match AnalysisConfig::from_raw(peaks, distance) {
                Err(RpmError::Config(ConfigError::InvalidValue { .. })) => {}
                other => panic!("Expected InvalidValue for ({}, {}), got {:?}", peaks, distance, other),
            }
        }

        let config = AnalysisConfig::from_raw(6, 0).unwrap();
        assert_eq!(config.num_peaks, 6);
        assert_eq!(config.min_distance_ms, 0);
        assert_eq!(config.channel_mode, ChannelMode::Mix);
    }

    #[test]
    fn test_non_finite_threshold_is_invalid() {
        let config = AnalysisConfig {
            height_threshold: f32::INFINITY,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
