//! Viewport parameters: zoom, pan and the contrast map.
//!
//! `offset_x` / `offset_y` are the image-space coordinates of the window's
//! top-left pixel, so one window pixel spans `1 / zoom_factor` image pixels.

/// Mid-gray level targeted by the contrast recentering actions.
pub const MID_GRAY: f64 = 127.5;

/// Zoom range kept by [`ViewState::zoom_about`]. Powers of two so that
/// doubling and halving land on the bounds exactly.
pub const MIN_ZOOM: f64 = 1.0 / (1u64 << 40) as f64;
pub const MAX_ZOOM: f64 = (1u64 << 20) as f64;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    pub zoom_factor: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub contrast_gain: f64,
    /// Scalar bias, tracked alongside the per-channel ones (not used for mapping).
    pub contrast_bias: f64,
    pub per_channel_bias: [f64; 3],
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom_factor: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            contrast_gain: 1.0,
            contrast_bias: 0.0,
            per_channel_bias: [0.0; 3],
        }
    }
}

impl ViewState {
    /// Window pixel -> image-space point.
    #[inline]
    pub fn window_to_image(&self, wx: f64, wy: f64) -> (f64, f64) {
        (self.offset_x + wx / self.zoom_factor, self.offset_y + wy / self.zoom_factor)
    }

    /// Image-space point -> window pixel containing it.
    #[inline]
    pub fn image_to_window(&self, ix: f64, iy: f64) -> (i64, i64) {
        (
            ((ix - self.offset_x) * self.zoom_factor).floor() as i64,
            ((iy - self.offset_y) * self.zoom_factor).floor() as i64,
        )
    }

    /// Affine display map `gain * value + bias[channel]`, clamped to a byte.
    #[inline]
    pub fn map(&self, value: f32, channel: usize) -> u8 {
        if !value.is_finite() {
            return 0;
        }
        let g = self.contrast_gain * value as f64 + self.per_channel_bias[channel];
        g.clamp(0.0, 255.0) as u8
    }

    #[inline]
    pub fn map_rgb(&self, rgb: [f32; 3]) -> [u8; 3] {
        [self.map(rgb[0], 0), self.map(rgb[1], 1), self.map(rgb[2], 2)]
    }

    /// Multiply the zoom by `factor`, keeping the image point under window pixel `(x, y)` fixed.
    /// The result is clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn zoom_about(&mut self, x: f64, y: f64, factor: f64) {
        let (cx, cy) = self.window_to_image(x, y);
        let zoom = self.zoom_factor * factor;
        self.zoom_factor = if zoom.is_nan() { self.zoom_factor } else { zoom.clamp(MIN_ZOOM, MAX_ZOOM) };
        self.offset_x = cx - x / self.zoom_factor;
        self.offset_y = cy - y / self.zoom_factor;
    }

    /// Move the view so that the image follows a pointer displacement of `(dx, dy)` window pixels.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x -= dx / self.zoom_factor;
        self.offset_y -= dy / self.zoom_factor;
    }

    /// Stretch `[lo, hi]` onto `[0, 255]`.
    pub fn auto_contrast(&mut self, (lo, hi): (f64, f64)) {
        self.contrast_gain = 255.0 / (hi - lo);
        self.contrast_bias = 255.0 * lo / (lo - hi);
        self.per_channel_bias = [self.contrast_bias; 3];
    }

    /// Choose biases so that `rgb` maps to mid-gray under the current gain.
    pub fn center_contrast_on(&mut self, rgb: [f32; 3]) {
        let a = self.contrast_gain;
        for (bias, &c) in self.per_channel_bias.iter_mut().zip(&rgb) {
            *bias = MID_GRAY - a * c as f64;
        }
        let mean = rgb.iter().map(|&c| c as f64).sum::<f64>() / 3.0;
        self.contrast_bias = MID_GRAY - a * mean;
    }

    /// Scale the gain by `factor` while keeping the values currently shown as mid-gray fixed.
    pub fn contrast_span(&mut self, factor: f64) {
        let a = self.contrast_gain;
        let center = (MID_GRAY - self.contrast_bias) / a;
        let centers = self.per_channel_bias.map(|b| (MID_GRAY - b) / a);
        self.contrast_gain *= factor;
        let a = self.contrast_gain;
        self.contrast_bias = MID_GRAY - a * center;
        self.per_channel_bias = centers.map(|c| MID_GRAY - a * c);
    }
}
