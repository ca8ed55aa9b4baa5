use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio::types::AudioData;
use crate::error::{AudioError, Result};

/// Audio file loader supporting multiple formats
///
/// The whole file is decoded into memory; turntable measurements are a few
/// minutes long at most.
pub struct AudioLoader;

impl AudioLoader {
    /// Load an audio file and return interleaved f32 samples
    pub fn load<P: AsRef<Path>>(path: P) -> Result<AudioData> {
        let path = path.as_ref();
        let extension = Self::detect_format(path).unwrap_or_default();

        if !path.exists() {
            return Err(AudioError::LoadFailed {
                path: path.display().to_string(),
            }
            .into());
        }

        if !Self::is_format_supported(&extension) {
            return Err(AudioError::UnsupportedFormat { format: extension }.into());
        }

        let audio = if extension == "wav" {
            Self::load_wav(path)?
        } else {
            Self::load_with_symphonia(path)?
        };

        tracing::info!(
            "Loaded {}: {:.2}s ({} frames), {} Hz, {} channel(s)",
            path.display(),
            audio.duration,
            audio.frame_count(),
            audio.sample_rate,
            audio.channels
        );

        Ok(audio)
    }

    /// Load WAV files using the hound crate
    fn load_wav(path: &Path) -> Result<AudioData> {
        let decode_failed = |e: hound::Error| AudioError::DecodeFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let reader = hound::WavReader::open(path).map_err(decode_failed)?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(decode_failed)?,
            hound::SampleFormat::Int => reader
                .into_samples::<i32>()
                .map(|sample| sample.map(|s| Self::int_to_float(s, spec.bits_per_sample)))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(decode_failed)?,
        };

        Self::validate_spec(path, spec.sample_rate, spec.channels)?;

        Ok(AudioData::from_interleaved(samples, spec.sample_rate, spec.channels))
    }

    /// Load compressed formats using Symphonia
    fn load_with_symphonia(path: &Path) -> Result<AudioData> {
        let decode_failed = |e: SymphoniaError| AudioError::DecodeFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let file = File::open(path).map_err(|_| AudioError::LoadFailed {
            path: path.display().to_string(),
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(decode_failed)?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::DecodeFailed {
                path: path.display().to_string(),
                reason: "no decodable audio track".to_string(),
            })?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();
        let sample_rate = codec_params.sample_rate.ok_or_else(|| AudioError::InvalidParameters {
            details: "No sample rate found".to_string(),
        })?;
        let channels = codec_params
            .channels
            .ok_or_else(|| AudioError::InvalidParameters {
                details: "No channel information found".to_string(),
            })?
            .count() as u16;

        Self::validate_spec(path, sample_rate, channels)?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(decode_failed)?;

        let mut samples = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(e) => return Err(decode_failed(e).into()),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let buf = sample_buf.get_or_insert_with(|| {
                        SampleBuffer::new(decoded.capacity() as u64, *decoded.spec())
                    });
                    if buf.capacity() < decoded.capacity() * decoded.spec().channels.count() {
                        *buf = SampleBuffer::new(decoded.capacity() as u64, *decoded.spec());
                    }
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
                Err(SymphoniaError::DecodeError(reason)) => {
                    // A corrupt packet drops a few milliseconds, not the measurement
                    tracing::warn!("Skipping undecodable packet: {}", reason);
                }
                Err(e) => return Err(decode_failed(e).into()),
            }
        }

        Ok(AudioData::from_interleaved(samples, sample_rate, channels))
    }

    fn validate_spec(path: &Path, sample_rate: u32, channels: u16) -> Result<()> {
        if sample_rate == 0 || channels == 0 {
            return Err(AudioError::InvalidParameters {
                details: format!(
                    "{}: sample rate {} Hz with {} channel(s)",
                    path.display(),
                    sample_rate,
                    channels
                ),
            }
            .into());
        }
        Ok(())
    }

    /// Convert a signed integer sample of the given bit depth to -1.0..1.0
    fn int_to_float(sample: i32, bit_depth: u16) -> f32 {
        let full_scale = (1u64 << (bit_depth.clamp(1, 32) - 1)) as f32;
        sample as f32 / full_scale
    }

    /// Detect audio format from file extension
    pub fn detect_format<P: AsRef<Path>>(path: P) -> Option<String> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Check if a file format is supported
    pub fn is_format_supported(extension: &str) -> bool {
        matches!(
            extension.to_lowercase().as_str(),
            "wav" | "mp3" | "flac" | "ogg" | "m4a" | "aac"
        )
    }
}
