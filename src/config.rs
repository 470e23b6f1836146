// Tunables of the viewer, gathered in one place.

/// Deepest pyramid octave the evaluator will ever request.
pub const MAX_PYRAMID_LEVELS: usize = 30;

#[derive(Clone, Debug)]
pub struct ViewerConfig {
    /// The window opens at min(image, max) in each dimension.
    pub max_window_width: usize,
    pub max_window_height: usize,
    /// Must be odd so the ROI has a center pixel.
    pub initial_roi_size: i32,
    /// Zoom step of the mouse wheel and of the '+' / '-' keys.
    pub wheel_factor: f64,
    pub fine_zoom_factor: f64,
    pub finer_zoom_factor: f64,
    /// Above this zoom each image pixel gets a value label.
    pub label_zoom_threshold: f64,
    pub contrast_span_factor: f64,
    /// Arrow keys pan by this many window pixels (shift /10, ctrl x10).
    pub pan_step: i32,
    /// Value range mapped onto [0,255] by auto-contrast.
    pub dynamic_range: (f64, f64),
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            max_window_width: 1000,
            max_window_height: 800,
            initial_roi_size: 73,
            wheel_factor: 2.0,
            fine_zoom_factor: 1.1,
            finer_zoom_factor: 1.006,
            label_zoom_threshold: 50.0,
            contrast_span_factor: 1.3,
            pan_step: 10,
            dynamic_range: (0.0, 255.0),
        }
    }
}

impl ViewerConfig {
    /// Initial window size for an image of the given extent.
    pub fn window_size(&self, image_width: usize, image_height: usize) -> (usize, usize) {
        (
            image_width.min(self.max_window_width).max(1),
            image_height.min(self.max_window_height).max(1),
        )
    }
}
