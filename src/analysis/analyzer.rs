use crate::analysis::peaks::PeakSelector;
use crate::analysis::stats::IntervalSeries;
use crate::analysis::types::{AnalysisConfig, AnalysisOutcome, RpmAnalysis};
use crate::audio::reducer::reduce;
use crate::audio::types::{AudioData, MonoSignal};
use crate::error::Result;

/// Runs channel reduction, peak selection and interval statistics in order
pub struct RpmAnalyzer {
    config: AnalysisConfig,
}

impl RpmAnalyzer {
    /// Create a new analyzer with default configuration
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    /// Create a new analyzer with custom configuration
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Measure the turntable speed in a decoded recording
    pub fn analyze(&self, audio: &AudioData) -> Result<AnalysisOutcome> {
        self.config.validate()?;

        tracing::info!(
            "Analysing {:.2}s of audio for {} peaks ({} channel)",
            audio.duration,
            self.config.num_peaks,
            self.config.channel_mode
        );

        let mono = reduce(audio, self.config.channel_mode)?;
        self.analyze_mono(&mono)
    }

    /// Measure from an already reduced signal
    pub fn analyze_mono(&self, mono: &MonoSignal) -> Result<AnalysisOutcome> {
        self.config.validate()?;

        let min_distance_samples = mono.ms_to_samples(self.config.min_distance_ms);
        tracing::debug!(
            "Minimum peak distance: {} ms = {} samples at {} Hz",
            self.config.min_distance_ms,
            min_distance_samples,
            mono.sample_rate
        );

        let peaks = PeakSelector::new(self.config.num_peaks, min_distance_samples)
            .with_height_threshold(self.config.height_threshold)
            .select(mono)?;

        if !peaks.is_complete() {
            return Ok(AnalysisOutcome::InsufficientPeaks {
                expected: self.config.num_peaks,
                found: peaks.len(),
            });
        }

        let series = IntervalSeries::from_times(&peaks.times())?;
        let Some(stats) = series.stats() else {
            return Ok(AnalysisOutcome::NoIntervals { found: peaks.len() });
        };

        tracing::info!(
            "Analysis complete: {} revolutions, average {:.4} RPM",
            series.len(),
            stats.average.rpm
        );

        Ok(AnalysisOutcome::Measured(RpmAnalysis {
            peaks,
            series,
            stats,
            config: self.config.clone(),
            min_distance_samples,
        }))
    }
}

impl Default for RpmAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::types::ChannelMode;
    use crate::error::{AudioError, RpmError};
    use approx::assert_relative_eq;

    const SAMPLE_RATE: u32 = 1000;

    /// Stereo recording with a tick on the right channel every `period`
    /// samples and a weaker, offset tick on the left channel
    fn ticking_stereo(ticks: usize, period: usize) -> AudioData {
        let frames = (ticks + 1) * period;
        let mut samples = vec![0.0f32; frames * 2];
        for tick in 0..ticks {
            let right = period / 2 + tick * period;
            samples[right * 2 + 1] = 0.9;
            samples[(right + period / 4) * 2] = 0.3;
        }
        AudioData::from_interleaved(samples, SAMPLE_RATE, 2)
    }

    fn config(mode: ChannelMode, num_peaks: usize, min_distance_ms: u32) -> AnalysisConfig {
        AnalysisConfig {
            channel_mode: mode,
            num_peaks,
            min_distance_ms,
            ..Default::default()
        }
    }

    #[test]
    fn test_measures_steady_speed() {
        // 1800 samples at 1 kHz = 1.8 s per revolution = 33.33 RPM
        let audio = ticking_stereo(6, 1800);
        let analyzer = RpmAnalyzer::with_config(config(ChannelMode::Right, 6, 1300));

        let outcome = analyzer.analyze(&audio).unwrap();
        let analysis = outcome.analysis().expect("measurement");

        assert_eq!(analysis.revolutions(), 5);
        assert_eq!(analysis.min_distance_samples, 1300);
        assert_relative_eq!(analysis.stats.average.rpm, 60.0 / 1.8, max_relative = 1e-9);
        assert_relative_eq!(analysis.stats.std_dev.seconds, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_min_distance_hides_the_other_channel() {
        // In the mix the left tick sits 450 samples after each right tick;
        // 1000 ms of separation leaves only the stronger right ticks
        let audio = ticking_stereo(4, 1800);
        let analyzer = RpmAnalyzer::with_config(config(ChannelMode::Mix, 4, 1000));

        let outcome = analyzer.analyze(&audio).unwrap();
        let analysis = outcome.analysis().expect("measurement");
        let indices: Vec<usize> = analysis.peaks.peaks().iter().map(|p| p.sample_index).collect();
        assert_eq!(indices, vec![900, 2700, 4500, 6300]);
    }

    #[test]
    fn test_insufficient_peaks_is_an_outcome() {
        let audio = ticking_stereo(3, 1800);
        let analyzer = RpmAnalyzer::with_config(config(ChannelMode::Right, 5, 1300));

        match analyzer.analyze(&audio).unwrap() {
            AnalysisOutcome::InsufficientPeaks { expected, found } => {
                assert_eq!(expected, 5);
                assert_eq!(found, 3);
            }
            other => panic!("Expected InsufficientPeaks, got {:?}", other),
        }
    }

    #[test]
    fn test_single_peak_has_no_intervals() {
        let audio = ticking_stereo(3, 1800);
        let analyzer = RpmAnalyzer::with_config(config(ChannelMode::Right, 1, 1300));

        assert!(matches!(
            analyzer.analyze(&audio).unwrap(),
            AnalysisOutcome::NoIntervals { found: 1 }
        ));
    }

    #[test]
    fn test_right_channel_of_mono_recording_fails() {
        let audio = AudioData::from_interleaved(vec![0.0; 100], SAMPLE_RATE, 1);
        let analyzer = RpmAnalyzer::with_config(config(ChannelMode::Right, 2, 10));

        assert!(matches!(
            analyzer.analyze(&audio),
            Err(RpmError::Audio(AudioError::InvalidChannel { .. }))
        ));
    }

    #[test]
    fn test_zero_peaks_fails_before_processing() {
        // The right channel does not exist; validation must trip first
        let audio = AudioData::from_interleaved(vec![0.0; 100], SAMPLE_RATE, 1);
        let analyzer = RpmAnalyzer::with_config(config(ChannelMode::Right, 0, 10));

        assert!(matches!(analyzer.analyze(&audio), Err(RpmError::Config(_))));
    }
}
