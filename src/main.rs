use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

use turntable_rpm::{
    analysis::{AnalysisConfig, AnalysisOutcome, RpmAnalysis, RpmAnalyzer},
    audio::{AudioLoader, ChannelMode},
    config::{Config, PlotConfig},
    error::{exit_code, RpmError},
    report::{insufficient_peaks_message, Precision, StatsReport},
};

#[derive(Parser)]
#[command(
    name = "turntable-rpm",
    version,
    about = "Measure turntable speed from a recording of a once-per-revolution tick",
    long_about = "Turntable RPM finds the strongest ticks in a recording, measures the time between consecutive ticks and reports the revolution time and speed statistics.",
    allow_negative_numbers = true
)]
struct Cli {
    /// Audio file path (WAV, MP3, FLAC, OGG, M4A)
    filename: PathBuf,

    /// Number of highest peaks to find
    num_peaks: i64,

    /// Minimum distance between peaks in milliseconds. Ex. 33 1/3 RPM: 1700, 45 RPM: 1300
    min_distance_ms: i64,

    /// Channel to analyse
    #[arg(long = "channel_mode", value_enum, ignore_case = true)]
    channel_mode: Option<ChannelMode>,

    /// Plot the revolution times
    #[arg(long = "plot_data", value_enum)]
    plot_data: Option<YesNo>,

    /// Title of the plot
    #[arg(long = "plot_title")]
    plot_title: Option<String>,

    /// Where to save the plot (default: next to the audio file)
    #[arg(long = "plot_output")]
    plot_output: Option<PathBuf>,

    /// Minimum amplitude a peak must reach
    #[arg(long = "height_threshold")]
    height_threshold: Option<f32>,

    /// Decimals printed in the statistics table
    #[arg(long, conflicts_with = "auto_decimals")]
    decimals: Option<usize>,

    /// Pick the number of decimals from the measured values
    #[arg(long = "auto_decimals")]
    auto_decimals: bool,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum YesNo {
    Yes,
    No,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let log_level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            let code = match err.downcast_ref::<RpmError>() {
                Some(rpm_error) => {
                    eprintln!("Error: {}", rpm_error.user_message());
                    rpm_error.exit_code()
                }
                None => {
                    eprintln!("Error: {:#}", err);
                    exit_code::INPUT
                }
            };
            ExitCode::from(code)
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    info!("Starting turntable-rpm v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli)?;

    let audio = AudioLoader::load(&cli.filename)
        .with_context(|| format!("Reading {}", cli.filename.display()))?;

    let analyzer = RpmAnalyzer::with_config(config.analysis.clone());
    let outcome = analyzer.analyze(&audio)?;
    let code = outcome_exit_code(&outcome);

    match outcome {
        AnalysisOutcome::Measured(analysis) => {
            print!(
                "{}",
                StatsReport::new(&analysis.stats, config.analysis.channel_mode, config.analysis.num_peaks)
                    .with_precision(config.report.precision)
            );

            if config.plot.enabled {
                save_plot(&cli.filename, &analysis, &config.plot)?;
            }
        }
        AnalysisOutcome::InsufficientPeaks { expected, found } => {
            println!("{}", insufficient_peaks_message(expected, found));
            skip_plot(&config.plot);
        }
        AnalysisOutcome::NoIntervals { found } => {
            println!("Could not calculate statistics from {} peak(s).", found);
            skip_plot(&config.plot);
        }
    }

    Ok(code)
}

/// Configuration file (or defaults) with command-line values applied, validated
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => Config::default(),
    };
    apply_overrides(&mut config, cli)?;
    config.validate()?;
    Ok(config)
}

fn outcome_exit_code(outcome: &AnalysisOutcome) -> u8 {
    match outcome {
        AnalysisOutcome::Measured(_) => exit_code::SUCCESS,
        AnalysisOutcome::InsufficientPeaks { .. } | AnalysisOutcome::NoIntervals { .. } => {
            exit_code::INSUFFICIENT_PEAKS
        }
    }
}

/// Command-line values win over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    let raw = AnalysisConfig::from_raw(cli.num_peaks, cli.min_distance_ms)?;
    config.analysis.num_peaks = raw.num_peaks;
    config.analysis.min_distance_ms = raw.min_distance_ms;

    if let Some(mode) = cli.channel_mode {
        config.analysis.channel_mode = mode;
    }
    if let Some(threshold) = cli.height_threshold {
        config.analysis.height_threshold = threshold;
    }

    if cli.auto_decimals {
        config.report.precision = Precision::Auto;
    } else if let Some(decimals) = cli.decimals {
        config.report.precision = Precision::Fixed(decimals);
    }

    if let Some(plot_data) = cli.plot_data {
        config.plot.enabled = plot_data == YesNo::Yes;
    }
    if let Some(title) = &cli.plot_title {
        config.plot.title = Some(title.clone());
    }
    if let Some(output) = &cli.plot_output {
        config.plot.output = Some(output.clone());
    }

    Ok(())
}

fn skip_plot(plot: &PlotConfig) {
    if plot.enabled {
        warn!("No statistics were computed, skipping the plot");
    }
}

#[cfg(feature = "plot")]
fn save_plot(audio_path: &Path, analysis: &RpmAnalysis, plot: &PlotConfig) -> Result<()> {
    use turntable_rpm::report::{default_plot_path, IntervalPlot};

    let output = plot
        .output
        .clone()
        .unwrap_or_else(|| default_plot_path(audio_path));

    IntervalPlot::new(&analysis.series.intervals)
        .with_title(plot.title.as_deref())
        .with_size(plot.width, plot.height)
        .save(&output)?;

    println!("Plot saved to {}", output.display());
    Ok(())
}

#[cfg(not(feature = "plot"))]
fn save_plot(_audio_path: &Path, _analysis: &RpmAnalysis, _plot: &PlotConfig) -> Result<()> {
    warn!("Built without the `plot` feature, skipping the plot");
    Ok(())
}
