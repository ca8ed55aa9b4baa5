//! Peak selection: the N highest local maxima of a mono signal, at least a
//! minimum distance apart, reported in chronological order.

use crate::audio::types::MonoSignal;
use crate::error::{AnalysisError, Result};

/// A local maximum of the analysis signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Position in samples from the start of the recording
    pub sample_index: usize,

    /// Signal amplitude at `sample_index`
    pub height: f32,
}

/// Peaks chosen by a [`PeakSelector`], sorted by sample index
#[derive(Debug, Clone, PartialEq)]
pub struct PeakSelection {
    peaks: Vec<Peak>,
    sample_rate: u32,
    requested: usize,
}

impl PeakSelection {
    pub fn peaks(&self) -> &[Peak] {
        &self.peaks
    }

    /// Peak positions in seconds, ascending
    pub fn times(&self) -> Vec<f64> {
        self.peaks
            .iter()
            .map(|peak| peak.sample_index as f64 / self.sample_rate as f64)
            .collect()
    }

    /// Peak amplitudes in the same order as [`times`](Self::times)
    pub fn heights(&self) -> Vec<f32> {
        self.peaks.iter().map(|peak| peak.height).collect()
    }

    /// Number of peaks that was asked for
    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// True when as many peaks were found as were requested
    pub fn is_complete(&self) -> bool {
        self.peaks.len() == self.requested
    }
}

/// Picks the strongest once-per-revolution transients from a signal
#[derive(Debug, Clone)]
pub struct PeakSelector {
    num_peaks: usize,
    min_distance: usize,
    height_threshold: f32,
}

impl PeakSelector {
    /// Select `num_peaks` peaks separated by at least `min_distance` samples
    pub fn new(num_peaks: usize, min_distance: usize) -> Self {
        Self {
            num_peaks,
            min_distance,
            height_threshold: 0.0,
        }
    }

    /// Minimum amplitude a local maximum needs to count as a candidate
    pub fn with_height_threshold(mut self, height_threshold: f32) -> Self {
        self.height_threshold = height_threshold;
        self
    }

    pub fn select(&self, signal: &MonoSignal) -> Result<PeakSelection> {
        self.validate(signal)?;

        let candidates: Vec<Peak> = local_maxima(&signal.samples)
            .into_iter()
            .map(|sample_index| Peak {
                sample_index,
                height: signal.samples[sample_index],
            })
            .filter(|peak| peak.height >= self.height_threshold)
            .collect();

        let total = candidates.len();
        let mut survivors = suppress_close_peaks(candidates, self.min_distance);

        tracing::debug!(
            "{} local maxima above {}, {} left after enforcing {} samples of separation",
            total,
            self.height_threshold,
            survivors.len(),
            self.min_distance
        );

        survivors.sort_by(by_prominence);
        survivors.truncate(self.num_peaks);
        survivors.sort_by_key(|peak| peak.sample_index);

        if survivors.len() < self.num_peaks {
            tracing::warn!(
                "Found {} of the {} requested peaks",
                survivors.len(),
                self.num_peaks
            );
        }

        Ok(PeakSelection {
            peaks: survivors,
            sample_rate: signal.sample_rate,
            requested: self.num_peaks,
        })
    }

    fn validate(&self, signal: &MonoSignal) -> Result<()> {
        if self.num_peaks == 0 {
            return Err(AnalysisError::InvalidArgument {
                details: "num_peaks must be at least 1".to_string(),
            }
            .into());
        }

        if !self.height_threshold.is_finite() {
            return Err(AnalysisError::InvalidArgument {
                details: format!("height threshold must be finite, got {}", self.height_threshold),
            }
            .into());
        }

        if signal.sample_rate == 0 {
            return Err(AnalysisError::InvalidArgument {
                details: "sample rate must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Indices of all local maxima, first and last sample excluded.
///
/// A flat top counts once, at the middle of the plateau (rounded down).
pub fn local_maxima(samples: &[f32]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if samples.len() < 3 {
        return maxima;
    }

    let last = samples.len() - 1;
    let mut i = 1;

    while i < last {
        if samples[i - 1] < samples[i] {
            let mut ahead = i + 1;
            while ahead < last && samples[ahead] == samples[i] {
                ahead += 1;
            }

            if samples[ahead] < samples[i] {
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }

    maxima
}

/// Higher peaks first, later peaks first among equals
fn by_prominence(a: &Peak, b: &Peak) -> std::cmp::Ordering {
    b.height
        .total_cmp(&a.height)
        .then(b.sample_index.cmp(&a.sample_index))
}

/// Greedy suppression: the highest remaining peak removes every neighbour
/// strictly closer than `min_distance` samples. `candidates` must be sorted by
/// sample index; the result is too.
fn suppress_close_peaks(candidates: Vec<Peak>, min_distance: usize) -> Vec<Peak> {
    // Distinct maxima are always at least 2 samples apart
    if min_distance <= 1 || candidates.len() < 2 {
        return candidates;
    }

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| by_prominence(&candidates[a], &candidates[b]));

    let mut keep = vec![true; candidates.len()];

    for &j in &order {
        if !keep[j] {
            continue;
        }
        let position = candidates[j].sample_index;

        for k in (0..j).rev() {
            if position - candidates[k].sample_index >= min_distance {
                break;
            }
            keep[k] = false;
        }

        for k in j + 1..candidates.len() {
            if candidates[k].sample_index - position >= min_distance {
                break;
            }
            keep[k] = false;
        }
    }

    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(peak, kept)| kept.then_some(peak))
        .collect()
}
