use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::stats::StatsRecord;
use crate::audio::types::ChannelMode;

/// Significant digits `Precision::Auto` keeps for the smallest value
const AUTO_SIGNIFICANT_DIGITS: i32 = 4;

/// Upper bound on printed decimals
pub const MAX_DECIMALS: usize = 12;

/// How many decimals the report prints. Every cell uses the same count so
/// the columns line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Always this many decimals
    Fixed(usize),

    /// Enough decimals to show the smallest non-zero value in the record with
    /// four significant digits, between 1 and [`MAX_DECIMALS`]
    Auto,
}

impl Default for Precision {
    fn default() -> Self {
        Self::Fixed(4)
    }
}

impl Precision {
    /// Decimals to use for `stats`
    pub fn decimals_for(&self, stats: &StatsRecord) -> usize {
        match *self {
            Self::Fixed(decimals) => decimals.min(MAX_DECIMALS),
            Self::Auto => {
                let smallest = stats
                    .rows()
                    .iter()
                    .flat_map(|(_, pair)| [pair.seconds.abs(), pair.rpm.abs()])
                    .filter(|v| *v > 0.0 && v.is_finite())
                    .fold(f64::INFINITY, f64::min);

                if !smallest.is_finite() {
                    return 1;
                }

                let magnitude = smallest.log10().floor() as i32;
                (AUTO_SIGNIFICANT_DIGITS - 1 - magnitude).clamp(1, MAX_DECIMALS as i32) as usize
            }
        }
    }
}

/// Text table of a measurement, as printed on stdout
pub struct StatsReport<'a> {
    stats: &'a StatsRecord,
    channel_mode: ChannelMode,
    num_peaks: usize,
    precision: Precision,
}

impl<'a> StatsReport<'a> {
    pub fn new(stats: &'a StatsRecord, channel_mode: ChannelMode, num_peaks: usize) -> Self {
        Self {
            stats,
            channel_mode,
            num_peaks,
            precision: Precision::default(),
        }
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }
}

impl fmt::Display for StatsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decimals = self.precision.decimals_for(self.stats);

        writeln!(f)?;
        writeln!(f, "Channel mode: {}", self.channel_mode)?;
        writeln!(f, "Revolutions: {}", self.num_peaks.saturating_sub(1))?;
        writeln!(f)?;
        writeln!(f, "{:<20} {:<35} {}", "Statistic", "Time Intervals (s)", "RPM Values")?;
        writeln!(f, "{}", "-".repeat(90))?;

        for (label, pair) in self.stats.rows() {
            let seconds = format!("{:.*}", decimals, pair.seconds);
            let rpm = format!("{:.*}", decimals, pair.rpm);
            writeln!(f, "{:<20} {:<35} {}", label, seconds, rpm)?;
        }

        Ok(())
    }
}

/// Message shown when the recording did not contain enough ticks
pub fn insufficient_peaks_message(expected: usize, found: usize) -> String {
    format!(
        "Expected {} peaks, but found {}. Unable to calculate statistics.",
        expected, found
    )
}
