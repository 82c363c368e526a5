use std::path::{Path, PathBuf};

use log::info;

use crate::{color::Color, error::RayTracerError, Result};

const MAX_PIXEL_VALUE: u8 = 255;
const MAX_LINE_LEN: usize = 70;

/// Where rendered pixels go. The renderer writes every pixel once
/// and then calls `finish` exactly once.
pub trait ImageSink {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn write_pixel(&mut self, column: usize, row: usize, color: Color);

    fn finish(&mut self) -> Result<()>;
}

/// We use row-major order for the Vec of pixels.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::black(); width * height],
        }
    }

    /// Panics if x or y are outside the canvas.
    pub fn pixel_at(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }

    /// Get a PPM-format string for the pixel values of the canvas.
    pub fn to_ppm(&self) -> String {
        let mut lines = vec![
            "P3".to_string(),
            format!("{} {}", self.width, self.height),
            MAX_PIXEL_VALUE.to_string(),
        ];

        for row in self.pixels.chunks(self.width.max(1)) {
            let mut line = String::new();
            for pixel in row {
                for value in [pixel.red, pixel.green, pixel.blue] {
                    let value = scale_and_clamp(value).to_string();
                    // 70 characters at most, counting the separating space
                    if !line.is_empty() && line.len() + 1 + value.len() > MAX_LINE_LEN {
                        lines.push(std::mem::take(&mut line));
                    }
                    if !line.is_empty() {
                        line.push(' ');
                    }
                    line.push_str(&value);
                }
            }
            lines.push(line);
        }

        lines.join("\n") + "\n"
    }
}

impl ImageSink for Canvas {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    /// Panics if the pixel is outside the canvas.
    fn write_pixel(&mut self, column: usize, row: usize, color: Color) {
        self.pixels[row * self.width + column] = color;
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A canvas that is saved as a PPM file once rendering finishes.
#[derive(Debug)]
pub struct PpmFile {
    canvas: Canvas,
    path: PathBuf,
}

impl PpmFile {
    pub fn new(path: impl AsRef<Path>, width: usize, height: usize) -> Self {
        Self {
            canvas: Canvas::new(width, height),
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageSink for PpmFile {
    fn width(&self) -> usize {
        self.canvas.width
    }

    fn height(&self) -> usize {
        self.canvas.height
    }

    fn write_pixel(&mut self, column: usize, row: usize, color: Color) {
        self.canvas.write_pixel(column, row, color);
    }

    fn finish(&mut self) -> Result<()> {
        std::fs::write(&self.path, self.canvas.to_ppm())?;
        info!("Wrote {}", self.path.display());
        Ok(())
    }
}

/// Paints every `interval`-th column and row of the sink with `color`,
/// starting from the top left pixel. Does not finish the sink.
pub fn print_grid<S: ImageSink + ?Sized>(sink: &mut S, interval: usize, color: Color) -> Result<()> {
    if interval == 0 {
        return Err(RayTracerError::InvalidSetting(
            "grid interval must be at least 1".to_string(),
        ));
    }

    for row in 0..sink.height() {
        for column in 0..sink.width() {
            if column % interval == 0 || row % interval == 0 {
                sink.write_pixel(column, row, color);
            }
        }
    }
    Ok(())
}

/// Scales to 0-255, and clamps to be between those values.
fn scale_and_clamp(val: f64) -> u8 {
    (val * MAX_PIXEL_VALUE as f64)
        .round()
        .clamp(0., MAX_PIXEL_VALUE as f64) as u8
}
