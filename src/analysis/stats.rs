//! Interval statistics: revolution times and the speeds they imply.

use crate::error::{AnalysisError, Result};

/// Seconds in a minute, the factor between a revolution time and RPM
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// A statistic evaluated on both the interval and the RPM sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatPair {
    pub seconds: f64,
    pub rpm: f64,
}

/// Summary of one measurement.
///
/// Each pair holds the statistic of the interval sequence and the same
/// statistic of the RPM sequence, computed independently. Since RPM falls as
/// the interval grows, `min.seconds` comes from the same revolution as
/// `max.rpm`, not `min.rpm`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsRecord {
    pub min: StatPair,
    pub max: StatPair,
    pub average: StatPair,
    pub std_dev: StatPair,
}

impl StatsRecord {
    /// Rows in report order, with their display labels
    pub fn rows(&self) -> [(&'static str, StatPair); 4] {
        [
            ("Min", self.min),
            ("Max", self.max),
            ("Average", self.average),
            ("Std Dev", self.std_dev),
        ]
    }
}

/// Revolution times and the RPM each one corresponds to
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalSeries {
    pub intervals: Vec<f64>,
    pub rpm: Vec<f64>,
}

impl IntervalSeries {
    /// Differences between consecutive peak times.
    ///
    /// Fails on any interval that is not strictly positive, so a duplicated
    /// timestamp never turns into an infinite speed.
    pub fn from_times(times: &[f64]) -> Result<Self> {
        let intervals = intervals(times);

        if let Some((index, &interval)) = intervals
            .iter()
            .enumerate()
            .find(|(_, &interval)| interval <= 0.0 || interval.is_nan())
        {
            return Err(AnalysisError::DegenerateInterval { index, interval }.into());
        }

        let rpm = intervals
            .iter()
            .map(|&interval| SECONDS_PER_MINUTE / interval)
            .collect();

        Ok(Self { intervals, rpm })
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Statistics of the series, `None` when it is empty
    pub fn stats(&self) -> Option<StatsRecord> {
        if self.is_empty() {
            return None;
        }

        let pair = |f: fn(&[f64]) -> f64| StatPair {
            seconds: f(&self.intervals),
            rpm: f(&self.rpm),
        };

        Some(StatsRecord {
            min: pair(min),
            max: pair(max),
            average: pair(mean),
            std_dev: pair(population_std_dev),
        })
    }
}

/// `times[i + 1] - times[i]` for every adjacent pair
pub fn intervals(times: &[f64]) -> Vec<f64> {
    times.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

/// Statistics for a chronological list of peak times.
///
/// Returns `Ok(None)` for fewer than two times: there is no interval to
/// measure, which is an outcome rather than an error.
pub fn compute_stats(times: &[f64]) -> Result<Option<StatsRecord>> {
    Ok(IntervalSeries::from_times(times)?.stats())
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with divisor N
fn population_std_dev(values: &[f64]) -> f64 {
    // Rounding in the mean would otherwise leave a residue for constant input
    if values.iter().all(|&v| v == values[0]) {
        return 0.0;
    }

    let mean = mean(values);
    let variance = values
        .iter()
        .map(|&v| (v - mean) * (v - mean))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}
