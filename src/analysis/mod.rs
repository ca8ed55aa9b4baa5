//! # Analysis Module
//!
//! Turns a decoded recording into a speed measurement:
//!
//! - **Peak selection**: the N strongest ticks, at least a minimum distance
//!   apart, in chronological order
//! - **Interval statistics**: revolution times, their RPM counterparts and
//!   min/max/mean/standard deviation of both
//!
//! ## Usage
//!
//! ```rust,no_run
//! use turntable_rpm::analysis::{AnalysisConfig, AnalysisOutcome, RpmAnalyzer};
//! use turntable_rpm::audio::AudioLoader;
//!
//! # fn main() -> anyhow::Result<()> {
//! let audio = AudioLoader::load("side_a.wav")?;
//! let analyzer = RpmAnalyzer::with_config(AnalysisConfig::from_raw(11, 1700)?);
//!
//! if let AnalysisOutcome::Measured(analysis) = analyzer.analyze(&audio)? {
//!     println!("Average speed: {:.3} RPM", analysis.stats.average.rpm);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod peaks;
pub mod stats;
pub mod types;
pub use analyzer::RpmAnalyzer;
pub use peaks::{Peak, PeakSelection, PeakSelector};
pub use stats::{compute_stats, IntervalSeries, StatPair, StatsRecord};
pub use types::{AnalysisConfig, AnalysisOutcome, RpmAnalysis};
