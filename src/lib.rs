//! # Turntable RPM
//!
//! Measures the rotational speed of a record turntable from a recording of
//! a once-per-revolution tick, such as a test record with a single click
//! groove or a contact microphone on the platter.
//!
//! The pipeline decodes the audio file, reduces it to one channel, picks the
//! strongest ticks subject to a minimum spacing, and summarises the time
//! between consecutive ticks as seconds per revolution and RPM.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use turntable_rpm::{
//!     analysis::{AnalysisConfig, AnalysisOutcome, RpmAnalyzer},
//!     audio::{AudioLoader, ChannelMode},
//!     report::StatsReport,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let audio = AudioLoader::load("deck_a_33.wav")?;
//!
//! let config = AnalysisConfig {
//!     channel_mode: ChannelMode::Left,
//!     ..AnalysisConfig::default()
//! };
//! let analyzer = RpmAnalyzer::with_config(config.clone());
//!
//! if let AnalysisOutcome::Measured(analysis) = analyzer.analyze(&audio)? {
//!     print!("{}", StatsReport::new(&analysis.stats, config.channel_mode, config.num_peaks));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`audio`] - Decoding and channel reduction
//! - [`analysis`] - Peak selection and interval statistics
//! - [`report`] - Statistics table and interval plot
//! - [`config`] - Configuration management
//! - [`error`] - Error types and process exit codes

pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod report;

// Re-export commonly used types for convenience
pub use crate::{
    analysis::{AnalysisConfig, AnalysisOutcome, RpmAnalysis, RpmAnalyzer},
    audio::{AudioData, AudioLoader, ChannelMode, MonoSignal},
    config::Config,
    error::{Result, RpmError},
    report::{Precision, StatsReport},
};
