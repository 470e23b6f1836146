//! Multi-resolution image source.
//!
//! Octave 0 is the decoded image at full resolution; octave `k` is a 2x2 box
//! average of octave `k - 1`. Sample values keep the native range of the
//! file (0..255 for 8-bit, 0..65535 for 16-bit, floats as stored).

use std::io::Read;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::config::MAX_PYRAMID_LEVELS;
use crate::error::OpenError;

/// Read-only access to a pyramid-tiled raster.
pub trait PyramidSource {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn channels(&self) -> usize;
    /// Value of `channel` at `(x, y)`, expressed in the coordinates of `octave`.
    fn sample(&self, octave: usize, x: f64, y: f64, channel: usize) -> f32;
}

struct Level {
    width: usize,
    height: usize,
    data: Vec<f32>, // interleaved, `channels` values per pixel
}

pub struct PyramidImage {
    channels: usize,
    levels: Vec<Level>,
}

impl PyramidImage {
    /// Open an image file, or standard input when `path` is `-`.
    pub fn open(path: &Path) -> Result<Self, OpenError> {
        let bytes = if path == Path::new("-") {
            let mut buf = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .map_err(|source| OpenError::Io { path: path.to_path_buf(), source })?;
            buf
        } else {
            std::fs::read(path).map_err(|source| OpenError::Io { path: path.to_path_buf(), source })?
        };

        let img = image::load_from_memory(&bytes)
            .map_err(|source| OpenError::Decode { path: path.to_path_buf(), source })?;
        let pyr = Self::from_dynamic(img).ok_or_else(|| OpenError::Empty { path: PathBuf::from(path) })?;
        tracing::info!(
            "opened {}: {}x{}, {} channel(s), {} octave(s)",
            path.display(),
            pyr.width(),
            pyr.height(),
            pyr.channels,
            pyr.octaves()
        );
        Ok(pyr)
    }

    /// Build from a decoded image. `None` for an empty image.
    pub fn from_dynamic(img: DynamicImage) -> Option<Self> {
        let (w, h) = (img.width() as usize, img.height() as usize);
        let (channels, data): (usize, Vec<f32>) = match img {
            DynamicImage::ImageLuma8(b) => (1, widen(b.as_raw(), |v| v as f32)),
            DynamicImage::ImageLumaA8(b) => (2, widen(b.as_raw(), |v| v as f32)),
            DynamicImage::ImageRgb8(b) => (3, widen(b.as_raw(), |v| v as f32)),
            DynamicImage::ImageRgba8(b) => (4, widen(b.as_raw(), |v| v as f32)),
            DynamicImage::ImageLuma16(b) => (1, widen(b.as_raw(), |v| v as f32)),
            DynamicImage::ImageLumaA16(b) => (2, widen(b.as_raw(), |v| v as f32)),
            DynamicImage::ImageRgb16(b) => (3, widen(b.as_raw(), |v| v as f32)),
            DynamicImage::ImageRgba16(b) => (4, widen(b.as_raw(), |v| v as f32)),
            DynamicImage::ImageRgb32F(b) => (3, b.into_raw()),
            DynamicImage::ImageRgba32F(b) => (4, b.into_raw()),
            other => (4, widen(other.to_rgba8().as_raw(), |v| v as f32)),
        };
        Self::from_interleaved(w, h, channels, data)
    }

    /// Build from raw interleaved samples. `None` for an empty or inconsistent buffer.
    pub fn from_interleaved(width: usize, height: usize, channels: usize, data: Vec<f32>) -> Option<Self> {
        if width == 0 || height == 0 || channels == 0 || data.len() != width * height * channels {
            return None;
        }
        let mut levels = vec![Level { width, height, data }];
        while levels.len() < MAX_PYRAMID_LEVELS {
            let prev = &levels[levels.len() - 1];
            if prev.width == 1 && prev.height == 1 {
                break;
            }
            let next = downsample(prev, channels);
            levels.push(next);
        }
        Some(Self { channels, levels })
    }

    pub fn octaves(&self) -> usize {
        self.levels.len()
    }
}

fn widen<T: Copy>(raw: &[T], f: impl Fn(T) -> f32) -> Vec<f32> {
    raw.iter().map(|&v| f(v)).collect()
}

/// Halve a level with a 2x2 box filter; odd edges average the pixels that exist.
fn downsample(prev: &Level, channels: usize) -> Level {
    let width = prev.width.div_ceil(2);
    let height = prev.height.div_ceil(2);
    let mut data = vec![0.0f32; width * height * channels];
    for y in 0..height {
        for x in 0..width {
            let xs = [2 * x, (2 * x + 1).min(prev.width - 1)];
            let ys = [2 * y, (2 * y + 1).min(prev.height - 1)];
            for c in 0..channels {
                let mut acc = 0.0f32;
                for &sy in &ys {
                    for &sx in &xs {
                        acc += prev.data[(sy * prev.width + sx) * channels + c];
                    }
                }
                data[(y * width + x) * channels + c] = acc * 0.25;
            }
        }
    }
    Level { width, height, data }
}

impl PyramidSource for PyramidImage {
    fn width(&self) -> usize {
        self.levels[0].width
    }

    fn height(&self) -> usize {
        self.levels[0].height
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn sample(&self, octave: usize, x: f64, y: f64, channel: usize) -> f32 {
        if channel >= self.channels {
            return f32::NAN;
        }
        let level = &self.levels[octave.min(self.levels.len() - 1)];
        // `as usize` saturates negatives and NaN to 0
        let xi = (x.floor() as usize).min(level.width - 1);
        let yi = (y.floor() as usize).min(level.height - 1);
        level.data[(yi * level.width + xi) * self.channels + channel]
    }
}
