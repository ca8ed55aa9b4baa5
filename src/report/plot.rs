//! Interval plot: revolution time per revolution, with an inverted RPM axis.

use std::path::{Path, PathBuf};

use crate::analysis::stats::SECONDS_PER_MINUTE;
use crate::error::{PlotError, Result};
use crate::report::canvas::Canvas;
use crate::report::font;

const WHITE: [u8; 3] = [255, 255, 255];
const BLACK: [u8; 3] = [0, 0, 0];
const GAINSBORO: [u8; 3] = [220, 220, 220];
/// Gainsboro at 50% opacity over white
const BAND: [u8; 3] = [238, 238, 238];
const LINE: [u8; 3] = [31, 119, 180];

/// Fraction of the data range added above and below
const MARGIN: f64 = 0.05;

const PAD_LEFT: i64 = 110;
const PAD_RIGHT: i64 = 110;
const PAD_TOP: i64 = 80;
const PAD_BOTTOM: i64 = 70;

const LABEL_SCALE: u32 = 2;
const TITLE_SCALE: u32 = 4;
const TICK_TARGET: usize = 8;

/// Data limits of the three axes. Every pair is (bottom/left, top/right).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotAxes {
    pub revolutions: (f64, f64),
    pub seconds: (f64, f64),
    /// `60 / seconds`, so the larger RPM sits at the bottom
    pub rpm: (f64, f64),
}

impl PlotAxes {
    /// Limits for a non-empty interval sequence
    pub fn for_intervals(intervals: &[f64]) -> Option<Self> {
        if intervals.is_empty() {
            return None;
        }

        let last = (intervals.len() - 1) as f64;
        let revolutions = if last > 0.0 {
            (-last * MARGIN, last * (1.0 + MARGIN))
        } else {
            (-0.5, 0.5)
        };

        let lo = intervals.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = intervals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let pad = if hi > lo { (hi - lo) * MARGIN } else { lo.abs() * MARGIN };

        // The bottom limit must stay positive for its RPM to be finite
        let mut bottom = lo - pad;
        if bottom <= 0.0 {
            bottom = lo / 2.0;
        }
        let top = hi + pad;

        Some(Self {
            revolutions,
            seconds: (bottom, top),
            rpm: (SECONDS_PER_MINUTE / bottom, SECONDS_PER_MINUTE / top),
        })
    }
}

/// Line chart of the revolution times of one measurement
pub struct IntervalPlot<'a> {
    intervals: &'a [f64],
    title: Option<&'a str>,
    width: u32,
    height: u32,
}

impl<'a> IntervalPlot<'a> {
    pub fn new(intervals: &'a [f64]) -> Self {
        Self {
            intervals,
            title: None,
            width: 1600,
            height: 800,
        }
    }

    pub fn with_title(mut self, title: Option<&'a str>) -> Self {
        self.title = title;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn render(&self) -> Result<Canvas> {
        let axes = PlotAxes::for_intervals(self.intervals).ok_or_else(|| PlotError::RenderFailed {
            reason: "no intervals to plot".to_string(),
        })?;

        let frame = PlotFrame::new(self.width, self.height, axes)?;
        let mut canvas = Canvas::new_filled(self.width, self.height, WHITE);

        self.draw_bands(&mut canvas, &frame);
        self.draw_grid(&mut canvas, &frame);
        self.draw_series(&mut canvas, &frame);
        self.draw_axes(&mut canvas, &frame);

        if let Some(title) = self.title {
            let width = font::text_width(title, TITLE_SCALE) as i64;
            let x = (self.width as i64 - width) / 2;
            canvas.text(x, (PAD_TOP - 5 * TITLE_SCALE as i64) / 2, title, TITLE_SCALE, BLACK);
        }

        Ok(canvas)
    }

    /// Render and write the plot as PNG
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.render()?.save_png(path)?;
        tracing::info!("Plot saved to {}", path.display());
        Ok(())
    }

    fn draw_bands(&self, canvas: &mut Canvas, frame: &PlotFrame) {
        for i in (0..self.intervals.len()).step_by(2) {
            let x0 = frame.x(i as f64 - 0.5).max(frame.left);
            let x1 = frame.x(i as f64 + 0.5).min(frame.right);
            if x0 <= x1 {
                canvas.fill_rect(x0, frame.top, x1, frame.bottom, BAND);
            }
        }
    }

    fn draw_grid(&self, canvas: &mut Canvas, frame: &PlotFrame) {
        let (x_lo, x_hi) = frame.axes.revolutions;
        for tick in integer_ticks(x_lo, x_hi, TICK_TARGET) {
            canvas.vline(frame.x(tick), frame.top, frame.bottom, GAINSBORO);
        }

        let (s_lo, s_hi) = frame.axes.seconds;
        for tick in nice_ticks(s_lo, s_hi, TICK_TARGET) {
            canvas.hline(frame.left, frame.right, frame.y_seconds(tick), GAINSBORO);
        }
    }

    fn draw_series(&self, canvas: &mut Canvas, frame: &PlotFrame) {
        let points: Vec<(i64, i64)> = self
            .intervals
            .iter()
            .enumerate()
            .map(|(i, &s)| (frame.x(i as f64), frame.y_seconds(s)))
            .collect();

        if let [(x, y)] = points.as_slice() {
            canvas.fill_rect(x - 3, y - 3, x + 3, y + 3, LINE);
        }
        for pair in points.windows(2) {
            canvas.line(pair[0], pair[1], 2, LINE);
        }
    }

    fn draw_axes(&self, canvas: &mut Canvas, frame: &PlotFrame) {
        canvas.hline(frame.left, frame.right, frame.top, BLACK);
        canvas.hline(frame.left, frame.right, frame.bottom, BLACK);
        canvas.vline(frame.left, frame.top, frame.bottom, BLACK);
        canvas.vline(frame.right, frame.top, frame.bottom, BLACK);

        let glyph_height = (font::GLYPH_HEIGHT * LABEL_SCALE) as i64;

        // Revolutions along the bottom
        let (x_lo, x_hi) = frame.axes.revolutions;
        for tick in integer_ticks(x_lo, x_hi, TICK_TARGET) {
            let x = frame.x(tick);
            let label = format!("{}", tick as i64);
            canvas.vline(x, frame.bottom, frame.bottom + 6, BLACK);
            canvas.text(x - text_width(&label) / 2, frame.bottom + 12, &label, LABEL_SCALE, BLACK);
        }
        let label = "REVOLUTIONS";
        canvas.text(
            (frame.left + frame.right - text_width(label)) / 2,
            frame.bottom + 12 + glyph_height + 16,
            label,
            LABEL_SCALE,
            BLACK,
        );

        // Seconds on the left
        let (s_lo, s_hi) = frame.axes.seconds;
        let ticks = nice_ticks(s_lo, s_hi, TICK_TARGET);
        let decimals = tick_decimals(&ticks);
        for tick in ticks {
            let y = frame.y_seconds(tick);
            let label = format!("{:.*}", decimals, tick);
            canvas.hline(frame.left - 6, frame.left, y, BLACK);
            canvas.text(frame.left - 12 - text_width(&label), y - glyph_height / 2, &label, LABEL_SCALE, BLACK);
        }
        canvas.text(frame.left - 60, frame.top - glyph_height - 12, "TIME (S)", LABEL_SCALE, BLACK);

        // RPM on the right, linear between its inverted limits
        let (r_bottom, r_top) = frame.axes.rpm;
        let ticks = nice_ticks(r_top.min(r_bottom), r_top.max(r_bottom), TICK_TARGET);
        let decimals = tick_decimals(&ticks);
        for tick in ticks {
            let y = frame.y_rpm(tick);
            let label = format!("{:.*}", decimals, tick);
            canvas.hline(frame.right, frame.right + 6, y, BLACK);
            canvas.text(frame.right + 12, y - glyph_height / 2, &label, LABEL_SCALE, BLACK);
        }
        canvas.text(frame.right + 12, frame.top - glyph_height - 12, "RPM", LABEL_SCALE, BLACK);
    }
}

/// Default PNG path: next to the recording, named after it
pub fn default_plot_path(audio_path: &Path) -> PathBuf {
    let stem = audio_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recording".to_string());
    let dir = audio_path.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{}_RPM_Analysis_Plot.png", stem))
}

/// Pixel geometry of the plotting area
struct PlotFrame {
    axes: PlotAxes,
    left: i64,
    right: i64,
    top: i64,
    bottom: i64,
}

impl PlotFrame {
    fn new(width: u32, height: u32, axes: PlotAxes) -> Result<Self> {
        let right = width as i64 - PAD_RIGHT;
        let bottom = height as i64 - PAD_BOTTOM;

        if right - PAD_LEFT < 10 || bottom - PAD_TOP < 10 {
            return Err(PlotError::RenderFailed {
                reason: format!("{}x{} is too small for a plot", width, height),
            }
            .into());
        }

        Ok(Self {
            axes,
            left: PAD_LEFT,
            right,
            top: PAD_TOP,
            bottom,
        })
    }

    fn x(&self, revolution: f64) -> i64 {
        let (lo, hi) = self.axes.revolutions;
        let t = (revolution - lo) / (hi - lo);
        self.left + (t * (self.right - self.left) as f64).round() as i64
    }

    fn y_seconds(&self, seconds: f64) -> i64 {
        let (bottom, top) = self.axes.seconds;
        self.y_fraction((seconds - bottom) / (top - bottom))
    }

    fn y_rpm(&self, rpm: f64) -> i64 {
        let (bottom, top) = self.axes.rpm;
        self.y_fraction((rpm - bottom) / (top - bottom))
    }

    /// 0.0 is the bottom edge, 1.0 the top
    fn y_fraction(&self, fraction: f64) -> i64 {
        self.bottom - (fraction * (self.bottom - self.top) as f64).round() as i64
    }
}

fn text_width(text: &str) -> i64 {
    font::text_width(text, LABEL_SCALE) as i64
}

/// Step of 1, 2 or 5 times a power of ten giving roughly `target` ticks
fn nice_step(span: f64, target: usize) -> f64 {
    let raw = span / target.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = match raw / magnitude {
        n if n <= 1.0 => 1.0,
        n if n <= 2.0 => 2.0,
        n if n <= 5.0 => 5.0,
        _ => 10.0,
    };
    step * magnitude
}

/// Multiples of a nice step inside `lo..=hi`
fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    if !lo.is_finite() || !hi.is_finite() || hi <= lo {
        return Vec::new();
    }

    let step = nice_step(hi - lo, target);
    let first = (lo / step).ceil() as i64;
    let last = (hi / step + 1e-9).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

fn integer_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    let step = nice_step(hi - lo, target).max(1.0).round();
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

/// Decimals needed to tell neighbouring ticks apart
fn tick_decimals(ticks: &[f64]) -> usize {
    match ticks {
        [a, b, ..] => (-(b - a).log10().floor()).max(0.0) as usize,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    #[test]
    fn test_rpm_axis_is_inverse_of_seconds_axis() {
        let axes = PlotAxes::for_intervals(&[1.79, 1.80, 1.81, 1.80]).unwrap();

        assert_relative_eq!(axes.seconds.0, 1.789, epsilon = 1e-12);
        assert_relative_eq!(axes.seconds.1, 1.811, epsilon = 1e-12);
        assert_eq!(axes.rpm.0, 60.0 / axes.seconds.0);
        assert_eq!(axes.rpm.1, 60.0 / axes.seconds.1);
        // Higher seconds at the top means lower RPM at the top
        assert!(axes.rpm.1 < axes.rpm.0);
        assert_relative_eq!(axes.revolutions.0, -0.15, epsilon = 1e-12);
        assert_relative_eq!(axes.revolutions.1, 3.15, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_series_gets_padding() {
        let axes = PlotAxes::for_intervals(&[2.0]).unwrap();
        assert_relative_eq!(axes.seconds.0, 1.9, epsilon = 1e-12);
        assert_relative_eq!(axes.seconds.1, 2.1, epsilon = 1e-12);
        assert_eq!(axes.revolutions, (-0.5, 0.5));
        assert!(PlotAxes::for_intervals(&[]).is_none());
    }

    #[test]
    fn test_nice_ticks() {
        assert_eq!(nice_ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        let ticks = nice_ticks(1.789, 1.811, 8);
        assert_eq!(ticks.len(), 5);
        assert_relative_eq!(ticks[0], 1.79, epsilon = 1e-9);
        assert_eq!(tick_decimals(&ticks), 3);
        assert!(nice_ticks(1.0, 1.0, 8).is_empty());
    }

    #[test]
    fn test_integer_ticks_never_fractional() {
        let ticks = integer_ticks(-0.05, 1.05, 8);
        assert_eq!(ticks, vec![0.0, 1.0]);
    }

    #[test]
    fn test_default_plot_path() {
        assert_eq!(
            default_plot_path(Path::new("/recordings/deck_a.wav")),
            PathBuf::from("/recordings/deck_a_RPM_Analysis_Plot.png")
        );
        assert_eq!(
            default_plot_path(Path::new("take2.flac")),
            PathBuf::from("take2_RPM_Analysis_Plot.png")
        );
    }

    #[test]
    fn test_render_draws_line_and_bands() {
        let intervals = [1.80, 1.79, 1.81, 1.80, 1.80];
        let canvas = IntervalPlot::new(&intervals)
            .with_title(Some("Deck A 33 RPM"))
            .render()
            .unwrap();

        assert_eq!((canvas.width(), canvas.height()), (1600, 800));

        let mut line_pixels = 0;
        let mut band_pixels = 0;
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                match canvas.get_pixel(x, y) {
                    LINE => line_pixels += 1,
                    BAND => band_pixels += 1,
                    _ => {}
                }
            }
        }
        assert!(line_pixels > 100);
        assert!(band_pixels > 1000);
    }

    #[test]
    fn test_too_small_canvas_fails() {
        let result = IntervalPlot::new(&[1.8, 1.8]).with_size(100, 100).render();
        assert!(result.is_err());
    }

    #[test]
    fn test_save_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plot.png");

        IntervalPlot::new(&[1.8, 1.81]).with_size(400, 300).save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
