//! Channel reduction: turn a multi-channel recording into one analysis channel.

use crate::audio::types::{AudioData, ChannelMode, MonoSignal};
use crate::error::{AudioError, Result};

/// Reduce `audio` to a single channel according to `mode`.
///
/// `Left` and `Right` copy channel 0 and 1 verbatim, `Mix` averages every
/// channel of each frame. The input buffer is only borrowed.
pub fn reduce(audio: &AudioData, mode: ChannelMode) -> Result<MonoSignal> {
    if audio.channels == 0 {
        return Err(AudioError::InvalidParameters {
            details: "audio buffer has no channels".to_string(),
        }
        .into());
    }

    let samples = match mode {
        ChannelMode::Left => select_channel(audio, 0, mode)?,
        ChannelMode::Right => select_channel(audio, 1, mode)?,
        ChannelMode::Mix => mix(audio),
    };

    tracing::debug!(
        "Reduced {} channel(s) to mono using '{}': {} samples",
        audio.channels,
        mode,
        samples.len()
    );

    Ok(MonoSignal::new(samples, audio.sample_rate))
}

fn select_channel(audio: &AudioData, channel: usize, mode: ChannelMode) -> Result<Vec<f32>> {
    audio.channel_samples(channel).ok_or_else(|| {
        AudioError::InvalidChannel {
            mode: mode.to_string(),
            channels: audio.channels,
        }
        .into()
    })
}

fn mix(audio: &AudioData) -> Vec<f32> {
    if audio.channels == 1 {
        return audio.samples.clone();
    }

    let channels = audio.channels as f32;
    audio
        .frames()
        .map(|frame| frame.iter().sum::<f32>() / channels)
        .collect()
}
