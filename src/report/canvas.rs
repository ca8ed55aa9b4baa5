use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};

use crate::error::{PlotError, Result};
use crate::report::font;

/// RGB drawing surface for the interval plot.
///
/// Coordinates are signed so shapes may run off the edge; anything outside
/// the image is clipped.
#[derive(Clone, Debug)]
pub struct Canvas {
    buffer: RgbImage,
}

impl Canvas {
    /// Create a new canvas with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_fn(width, height, |_, _| Rgb(color));
        Self { buffer }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.buffer.get_pixel(x, y).0
    }

    /// Set a pixel, ignoring coordinates outside the canvas
    pub fn set_pixel(&mut self, x: i64, y: i64, color: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        self.buffer.put_pixel(x as u32, y as u32, Rgb(color));
    }

    /// Fill the rectangle spanning `x0..=x1`, `y0..=y1`
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: [u8; 3]) {
        let (x0, x1) = (x0.min(x1).max(0), x0.max(x1).min(self.width() as i64 - 1));
        let (y0, y1) = (y0.min(y1).max(0), y0.max(y1).min(self.height() as i64 - 1));

        for y in y0..=y1 {
            for x in x0..=x1 {
                self.buffer.put_pixel(x as u32, y as u32, Rgb(color));
            }
        }
    }

    pub fn hline(&mut self, x0: i64, x1: i64, y: i64, color: [u8; 3]) {
        self.fill_rect(x0, y, x1, y, color);
    }

    pub fn vline(&mut self, x: i64, y0: i64, y1: i64, color: [u8; 3]) {
        self.fill_rect(x, y0, x, y1, color);
    }

    /// Straight line with a square pen `thickness` pixels wide (Bresenham)
    pub fn line(&mut self, from: (i64, i64), to: (i64, i64), thickness: u32, color: [u8; 3]) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        let half = thickness as i64 / 2;
        let reach = (thickness as i64 - 1) - half;

        loop {
            self.fill_rect(x - half, y - half, x + reach, y + reach, color);
            if (x, y) == to {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draw `text` with its top-left corner at (`x`, `y`)
    pub fn text(&mut self, x: i64, y: i64, text: &str, scale: u32, color: [u8; 3]) {
        let scale = scale.max(1) as i64;

        for (i, c) in text.chars().enumerate() {
            let origin = x + i as i64 * font::ADVANCE as i64 * scale;
            for (row, bits) in font::glyph(c).iter().enumerate() {
                for col in 0..font::GLYPH_WIDTH {
                    if bits & (1 << (font::GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let px = origin + col as i64 * scale;
                    let py = y + row as i64 * scale;
                    self.fill_rect(px, py, px + scale - 1, py + scale - 1, color);
                }
            }
        }
    }

    /// Save the canvas as a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.buffer.save(path).map_err(|e| PlotError::SaveFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 3] = [255, 255, 255];
    const BLACK: [u8; 3] = [0, 0, 0];

    #[test]
    fn test_fill_rect_clips() {
        let mut canvas = Canvas::new_filled(10, 10, WHITE);
        canvas.fill_rect(-5, -5, 2, 2, BLACK);
        canvas.fill_rect(8, 8, 50, 50, BLACK);

        assert_eq!(canvas.get_pixel(0, 0), BLACK);
        assert_eq!(canvas.get_pixel(2, 2), BLACK);
        assert_eq!(canvas.get_pixel(3, 3), WHITE);
        assert_eq!(canvas.get_pixel(9, 9), BLACK);
    }

    #[test]
    fn test_line_hits_both_ends() {
        let mut canvas = Canvas::new_filled(20, 20, WHITE);
        canvas.line((1, 2), (17, 11), 1, BLACK);

        assert_eq!(canvas.get_pixel(1, 2), BLACK);
        assert_eq!(canvas.get_pixel(17, 11), BLACK);
        assert_eq!(canvas.get_pixel(17, 2), WHITE);
    }

    #[test]
    fn test_text_draws_glyph_pixels() {
        let mut canvas = Canvas::new_filled(20, 20, WHITE);
        // '1' has its top row in the middle column only
        canvas.text(0, 0, "1", 2, BLACK);

        assert_eq!(canvas.get_pixel(0, 0), WHITE);
        assert_eq!(canvas.get_pixel(2, 0), BLACK);
        assert_eq!(canvas.get_pixel(3, 1), BLACK);
        assert_eq!(canvas.get_pixel(4, 0), WHITE);
    }
}
