use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Decoded audio with metadata
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Audio samples, interleaved frame by frame
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Duration in seconds
    pub duration: f64,
}

impl AudioData {
    /// Build an in-memory buffer from interleaved samples
    pub fn from_interleaved(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        let duration = if sample_rate == 0 || channels == 0 {
            0.0
        } else {
            samples.len() as f64 / (sample_rate as f64 * channels as f64)
        };

        Self {
            samples,
            sample_rate,
            channels,
            duration,
        }
    }

    /// Number of sample frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Iterate over complete frames, one slice of `channels` samples each
    pub fn frames(&self) -> std::slice::ChunksExact<'_, f32> {
        self.samples.chunks_exact(self.channels.max(1) as usize)
    }

    /// Get samples for a specific channel (0-based), or `None` if out of range
    pub fn channel_samples(&self, channel: usize) -> Option<Vec<f32>> {
        if channel >= self.channels as usize {
            return None;
        }

        Some(self.frames().map(|frame| frame[channel]).collect())
    }
}

/// Which part of a multi-channel recording is analysed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChannelMode {
    /// First channel only
    Left,

    /// Second channel only
    Right,

    /// Average of every channel
    #[default]
    Mix,
}

impl ChannelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Mix => "mix",
        }
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "mix" => Ok(Self::Mix),
            _ => Err(ConfigError::InvalidChannelMode {
                value: value.to_string(),
            }),
        }
    }
}

/// Single analysis channel with its sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct MonoSignal {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl MonoSignal {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Convert a span in milliseconds to whole samples, rounded to nearest
    pub fn ms_to_samples(&self, ms: u32) -> usize {
        (ms as f64 / 1000.0 * self.sample_rate as f64).round() as usize
    }
}
