use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use tempfile::{tempdir, TempDir};

use turntable_rpm::{
    analysis::{AnalysisConfig, AnalysisOutcome, RpmAnalyzer},
    audio::{AudioLoader, ChannelMode},
    config::Config,
    error::{exit_code, AudioError, RpmError},
    report::{Precision, StatsReport},
};

const SAMPLE_RATE: u32 = 8000;

/// Revolution lengths in samples, alternating slightly fast and slightly slow
const SHORT: usize = 10_660;
const LONG: usize = 10_674;

/// Write a 16-bit WAV with `ticks` clicks, the first half a second in.
/// Clicks decay over a few samples so each one has a single maximum.
fn write_recording(dir: &TempDir, name: &str, ticks: usize, channels: u16) -> PathBuf {
    let mut onsets = vec![SAMPLE_RATE as usize / 2];
    for i in 1..ticks {
        let step = if i % 2 == 1 { SHORT } else { LONG };
        onsets.push(onsets[i - 1] + step);
    }

    let frames = onsets.last().copied().unwrap_or(0) + SAMPLE_RATE as usize / 2;
    let mut click = vec![0.0f32; frames];
    for &onset in &onsets {
        for (offset, level) in [1.0, 0.5, 0.25, 0.125].iter().enumerate() {
            click[onset + offset] = 0.8 * level;
        }
    }

    let path = dir.path().join(name);
    let spec = hound::WavSpec {
        channels,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for value in click {
        for channel in 0..channels {
            // The right channel carries a quieter copy
            let gain = if channel == 0 { 1.0 } else { 0.5 };
            writer.write_sample((value * gain * i16::MAX as f32) as i16).unwrap();
        }
    }
    writer.finalize().unwrap();
    path
}

fn analyzer(channel_mode: ChannelMode, num_peaks: usize) -> RpmAnalyzer {
    RpmAnalyzer::with_config(AnalysisConfig {
        channel_mode,
        num_peaks,
        min_distance_ms: 1300,
        ..Default::default()
    })
}

#[test]
fn test_wav_to_report() {
    let dir = tempdir().unwrap();
    let path = write_recording(&dir, "deck_45.wav", 7, 2);

    let audio = AudioLoader::load(&path).unwrap();
    assert_eq!(audio.channels, 2);
    assert_eq!(audio.sample_rate, SAMPLE_RATE);

    let outcome = analyzer(ChannelMode::Mix, 7).analyze(&audio).unwrap();
    let analysis = outcome.analysis().expect("all ticks found");

    assert_eq!(analysis.revolutions(), 6);
    assert_eq!(analysis.min_distance_samples, 10_400);

    let short = SHORT as f64 / SAMPLE_RATE as f64;
    let long = LONG as f64 / SAMPLE_RATE as f64;
    let stats = &analysis.stats;
    assert_relative_eq!(stats.min.seconds, short, epsilon = 1e-9);
    assert_relative_eq!(stats.max.seconds, long, epsilon = 1e-9);
    assert_relative_eq!(stats.average.seconds, (short + long) / 2.0, epsilon = 1e-9);
    assert_relative_eq!(stats.std_dev.seconds, (long - short) / 2.0, epsilon = 1e-9);

    // The slowest revolution gives the lowest speed
    assert_relative_eq!(stats.min.rpm, 60.0 / long, epsilon = 1e-9);
    assert_relative_eq!(stats.max.rpm, 60.0 / short, epsilon = 1e-9);

    let text = StatsReport::new(stats, ChannelMode::Mix, 7).to_string();
    assert!(text.contains("Channel mode: mix"));
    assert!(text.contains("Revolutions: 6"));
    assert!(text.contains(&format!("{:<20} {:<35} {:.4}", "Min", format!("{:.4}", short), 60.0 / long)));
}

#[test]
fn test_channels_measure_the_same_ticks() {
    let dir = tempdir().unwrap();
    let path = write_recording(&dir, "stereo.wav", 5, 2);
    let audio = AudioLoader::load(&path).unwrap();

    let times = |mode| {
        analyzer(mode, 5)
            .analyze(&audio)
            .unwrap()
            .analysis()
            .map(|analysis| analysis.peaks.times())
            .unwrap()
    };

    assert_eq!(times(ChannelMode::Left), times(ChannelMode::Right));
    assert_eq!(times(ChannelMode::Left), times(ChannelMode::Mix));
}

#[test]
fn test_too_few_ticks() {
    let dir = tempdir().unwrap();
    let path = write_recording(&dir, "short.wav", 4, 2);
    let audio = AudioLoader::load(&path).unwrap();

    match analyzer(ChannelMode::Left, 11).analyze(&audio).unwrap() {
        AnalysisOutcome::InsufficientPeaks { expected, found } => {
            assert_eq!(expected, 11);
            assert_eq!(found, 4);
        }
        other => panic!("Expected InsufficientPeaks, got {:?}", other),
    }
}

#[test]
fn test_right_channel_of_mono_file() {
    let dir = tempdir().unwrap();
    let path = write_recording(&dir, "mono.wav", 3, 1);
    let audio = AudioLoader::load(&path).unwrap();

    let err = analyzer(ChannelMode::Right, 3).analyze(&audio).unwrap_err();
    assert!(matches!(err, RpmError::Audio(AudioError::InvalidChannel { channels: 1, .. })));
    assert_eq!(err.exit_code(), exit_code::CONFIGURATION);
}

#[test]
fn test_missing_file() {
    let err = AudioLoader::load(Path::new("/nonexistent/side_b.wav")).unwrap_err();
    assert_eq!(err.exit_code(), exit_code::INPUT);
}

#[test]
fn test_config_file_drives_analysis() {
    let dir = tempdir().unwrap();
    let path = write_recording(&dir, "configured.wav", 5, 2);
    let config_path = dir.path().join("rpm.toml");
    std::fs::write(
        &config_path,
        "[analysis]\nchannel_mode = \"LEFT\"\nnum_peaks = 5\n\n[report]\nprecision = \"auto\"\n",
    )
    .unwrap();

    // Channel modes in files are lowercase only
    assert!(Config::from_file(&config_path).is_err());

    std::fs::write(
        &config_path,
        "[analysis]\nchannel_mode = \"left\"\nnum_peaks = 5\n\n[report]\nprecision = \"auto\"\n",
    )
    .unwrap();
    let config = Config::from_file(&config_path).unwrap();
    config.validate().unwrap();

    let audio = AudioLoader::load(&path).unwrap();
    let outcome = RpmAnalyzer::with_config(config.analysis.clone())
        .analyze(&audio)
        .unwrap();
    let analysis = outcome.analysis().expect("all ticks found");

    assert_eq!(analysis.config.channel_mode, ChannelMode::Left);
    assert_eq!(analysis.revolutions(), 4);

    // Four significant digits of the 0.000875 s deviation
    let text = StatsReport::new(&analysis.stats, config.analysis.channel_mode, 5)
        .with_precision(config.report.precision)
        .to_string();
    assert_eq!(config.report.precision, Precision::Auto);
    assert!(text.contains("0.0008750"));
}

#[cfg(feature = "plot")]
#[test]
fn test_plot_is_written_next_to_recording() {
    use turntable_rpm::report::{default_plot_path, IntervalPlot};

    let dir = tempdir().unwrap();
    let path = write_recording(&dir, "side_a.wav", 7, 2);
    let audio = AudioLoader::load(&path).unwrap();
    let outcome = analyzer(ChannelMode::Mix, 7).analyze(&audio).unwrap();
    let analysis = outcome.analysis().expect("all ticks found");

    let output = default_plot_path(&path);
    assert_eq!(output, dir.path().join("side_a_RPM_Analysis_Plot.png"));

    IntervalPlot::new(&analysis.series.intervals)
        .with_title(Some("Side A"))
        .save(&output)
        .unwrap();

    assert_eq!(image::image_dimensions(&output).unwrap(), (1600, 800));
}
