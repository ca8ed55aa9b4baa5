//! # Audio Module
//!
//! Decoding of recordings and reduction to the single channel the peak
//! detector works on.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use turntable_rpm::audio::{reduce, AudioLoader, ChannelMode};
//!
//! # fn main() -> anyhow::Result<()> {
//! let audio = AudioLoader::load("side_a.wav")?;
//! let mono = reduce(&audio, ChannelMode::Right)?;
//!
//! println!("{} samples at {} Hz", mono.len(), mono.sample_rate);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod reducer;
pub mod types;
pub use loader::AudioLoader;
pub use reducer::reduce;
pub use types::{AudioData, ChannelMode, MonoSignal};
