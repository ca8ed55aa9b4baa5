// Writes a synthetic turntable recording: one tick per revolution on a quiet
// noise floor, with optional sinusoidal wow.

use std::f64::consts::PI;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{info, Level};

/// Silence before the first and after the last tick, in seconds
const MARGIN_SECONDS: f64 = 0.5;

/// Decay time constant of a tick, in seconds
const TICK_DECAY_SECONDS: f64 = 0.003;

#[derive(Parser)]
#[command(
    name = "synth_turntable",
    version,
    about = "Write a synthetic stereo WAV with one tick per turntable revolution"
)]
struct Cli {
    /// Output WAV file
    output: PathBuf,

    /// Nominal platter speed
    #[arg(long, default_value = "33.3333")]
    rpm: f64,

    /// Number of revolutions (ticks = revolutions + 1)
    #[arg(long, default_value_t = 10)]
    revolutions: usize,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 44100)]
    sample_rate: u32,

    /// Peak speed deviation as a fraction of the nominal speed
    #[arg(long, default_value_t = 0.0)]
    wow: f64,

    /// Peak amplitude of the uniform background noise
    #[arg(long, default_value_t = 0.01)]
    noise: f32,

    /// Seed for the noise generator
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    validate(&cli)?;

    let ticks = tick_times(&cli);
    let samples = render(&cli, &ticks);

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: cli.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&cli.output, spec)
        .with_context(|| format!("Creating {}", cli.output.display()))?;
    for sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;

    let span = ticks.last().copied().unwrap_or_default() - ticks.first().copied().unwrap_or_default();
    info!(
        "Wrote {} ticks to {} (mean {:.4} RPM)",
        ticks.len(),
        cli.output.display(),
        60.0 * cli.revolutions as f64 / span
    );
    Ok(())
}

fn validate(cli: &Cli) -> Result<()> {
    if cli.rpm <= 0.0 || !cli.rpm.is_finite() {
        bail!("rpm must be positive, got {}", cli.rpm);
    }
    if cli.revolutions == 0 {
        bail!("at least one revolution is required");
    }
    if cli.sample_rate == 0 {
        bail!("sample rate must be positive");
    }
    if !(0.0..0.5).contains(&cli.wow) {
        bail!("wow must be in [0, 0.5), got {}", cli.wow);
    }
    if !(0.0..=0.5).contains(&cli.noise) {
        bail!("noise must be in [0, 0.5], got {}", cli.noise);
    }
    Ok(())
}

/// Tick times in seconds. Wow completes one cycle over the recording.
fn tick_times(cli: &Cli) -> Vec<f64> {
    let nominal = 60.0 / cli.rpm;
    let mut time = MARGIN_SECONDS;
    let mut ticks = vec![time];

    for revolution in 0..cli.revolutions {
        let phase = 2.0 * PI * revolution as f64 / cli.revolutions as f64;
        let speed = 1.0 + cli.wow * phase.sin();
        time += nominal / speed;
        ticks.push(time);
    }

    ticks
}

/// Interleaved stereo samples; the right channel carries the ticks at half level
fn render(cli: &Cli, ticks: &[f64]) -> Vec<f32> {
    let sr = cli.sample_rate as f64;
    let end = ticks.last().copied().unwrap_or(0.0) + MARGIN_SECONDS;
    let frames = (end * sr).ceil() as usize;

    let mut signal = vec![0.0f32; frames];
    let decay_samples = TICK_DECAY_SECONDS * sr;
    let tick_len = (decay_samples * 8.0).ceil() as usize;

    for &tick in ticks {
        let onset = (tick * sr).round() as usize;
        for (offset, slot) in signal.iter_mut().skip(onset).take(tick_len).enumerate() {
            *slot += 0.9 * (-(offset as f64) / decay_samples).exp() as f32;
        }
    }

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let noise = |rng: &mut StdRng| {
        if cli.noise > 0.0 {
            rng.gen_range(-cli.noise..=cli.noise)
        } else {
            0.0
        }
    };

    let mut samples = Vec::with_capacity(frames * 2);
    for value in signal {
        samples.push(value + noise(&mut rng));
        samples.push(0.5 * value + noise(&mut rng));
    }
    samples
}
