//! Region of interest: a square window-space patch shown through one of
//! several transforms of the underlying image.

use crate::fourier::Fft2d;
use crate::pixel;
use crate::ppsmooth;
use crate::source::PyramidSource;
use crate::types::{FrameBuffer, Patch};
use crate::view::ViewState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoiMode {
    Off,
    /// Spectrum of the periodic component.
    DftWindow,
    /// Spectrum of the raw patch.
    RawFourier,
    /// Smooth component, shown directly.
    PpSmooth,
}

impl RoiMode {
    const CYCLE: [RoiMode; 4] = [RoiMode::Off, RoiMode::DftWindow, RoiMode::RawFourier, RoiMode::PpSmooth];

    fn index(self) -> usize {
        match self {
            RoiMode::Off => 0,
            RoiMode::DftWindow => 1,
            RoiMode::RawFourier => 2,
            RoiMode::PpSmooth => 3,
        }
    }

    pub fn step(self, backward: bool) -> Self {
        let delta: isize = if backward { -1 } else { 1 };
        let i = (self.index() as isize + delta).rem_euclid(Self::CYCLE.len() as isize);
        Self::CYCLE[i as usize]
    }

    pub fn is_active(self) -> bool {
        self != RoiMode::Off
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoiState {
    pub mode: RoiMode,
    /// Window coordinates of the center pixel.
    pub center_x: i32,
    pub center_y: i32,
    /// Side length, always odd.
    pub size: i32,
}

impl RoiState {
    pub fn new(center_x: i32, center_y: i32, size: i32) -> Self {
        Self { mode: RoiMode::Off, center_x, center_y, size: make_odd(size) }
    }

    /// Cycle the mode and recenter on the cursor.
    pub fn cycle(&mut self, backward: bool, x: i32, y: i32) {
        self.mode = self.mode.step(backward);
        self.center_x = x;
        self.center_y = y;
        tracing::info!("ROI mode {:?}", self.mode);
    }

    /// Grow or shrink by an even amount; never below one pixel.
    pub fn resize(&mut self, delta: i32) {
        self.size = make_odd((self.size + delta).max(1));
        tracing::debug!("ROI size {}", self.size);
    }

    /// Follow the cursor. Returns whether anything moved.
    pub fn follow(&mut self, x: i32, y: i32) -> bool {
        if !self.mode.is_active() || (self.center_x, self.center_y) == (x, y) {
            return false;
        }
        self.center_x = x;
        self.center_y = y;
        true
    }

    /// Window position of patch pixel `(i, j)`.
    #[inline]
    pub fn window_pos(&self, i: usize, j: usize) -> (i64, i64) {
        let half = (self.size / 2) as i64;
        (
            self.center_x as i64 - half + i as i64,
            self.center_y as i64 - half + j as i64,
        )
    }
}

fn make_odd(size: i32) -> i32 {
    if size % 2 == 0 { size + 1 } else { size }
}

/// Owns the FFT plans and the extraction buffer reused across frames.
pub struct RoiEngine {
    fft: Fft2d,
    input: Patch,
}

impl Default for RoiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RoiEngine {
    pub fn new() -> Self {
        Self { fft: Fft2d::new(), input: Patch::zeros(0) }
    }

    /// Sample the raw (not contrast-mapped) image under the ROI.
    pub fn extract<S: PyramidSource + ?Sized>(&mut self, src: &S, view: &ViewState, roi: &RoiState) -> &Patch {
        let n = roi.size.max(0) as usize;
        self.input.size = n;
        self.input.data.clear();
        self.input.data.resize(3 * n * n, 0.0);
        for j in 0..n {
            for i in 0..n {
                let (wx, wy) = roi.window_pos(i, j);
                let (ix, iy) = view.window_to_image(wx as f64, wy as f64);
                let rgb = pixel::evaluate(src, view.zoom_factor, ix, iy);
                self.input.set_pixel(i, j, rgb);
            }
        }
        &self.input
    }

    /// Apply `mode` to `patch`. `None` when the ROI is off.
    pub fn transform(&mut self, mode: RoiMode, patch: &Patch) -> Option<Patch> {
        match mode {
            RoiMode::Off => None,
            RoiMode::PpSmooth => Some(ppsmooth::decompose_patch(&mut self.fft, patch).1),
            RoiMode::RawFourier => Some(self.spectrum(patch)),
            RoiMode::DftWindow => {
                let (periodic, _) = ppsmooth::decompose_patch(&mut self.fft, patch);
                Some(self.spectrum(&periodic))
            }
        }
    }

    fn spectrum(&mut self, patch: &Patch) -> Patch {
        let n = patch.size;
        let planes = patch.to_planar();
        let spectra = planes.map(|plane| self.fft.log_spectrum(&plane, n));
        Patch::from_planar(n, &spectra)
    }

    /// Extract, transform and draw the ROI on top of `frame`.
    pub fn render<S: PyramidSource + ?Sized>(
        &mut self,
        frame: &mut FrameBuffer,
        src: &S,
        view: &ViewState,
        roi: &RoiState,
    ) {
        if !roi.mode.is_active() {
            return;
        }
        self.extract(src, view, roi);
        let input = std::mem::replace(&mut self.input, Patch::zeros(0));
        let out = self.transform(roi.mode, &input);
        self.input = input;
        if let Some(out) = out {
            blit(frame, view, roi, &out);
        }
    }
}

/// Contrast-map `patch` and write it at the ROI position; pixels outside the window are dropped.
pub fn blit(frame: &mut FrameBuffer, view: &ViewState, roi: &RoiState, patch: &Patch) {
    for j in 0..patch.size {
        for i in 0..patch.size {
            let (x, y) = roi.window_pos(i, j);
            if frame.contains(x, y) {
                frame.put(x as usize, y as usize, view.map_rgb(patch.pixel(i, j)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::tests::FnSource;

    #[test]
    fn four_steps_return_to_off_both_ways() {
        let mut m = RoiMode::Off;
        for _ in 0..4 {
            m = m.step(false);
        }
        assert_eq!(m, RoiMode::Off);
        for _ in 0..4 {
            m = m.step(true);
        }
        assert_eq!(m, RoiMode::Off);
        assert_eq!(RoiMode::Off.step(true), RoiMode::PpSmooth);
        assert_eq!(RoiMode::Off.step(false), RoiMode::DftWindow);
    }

    #[test]
    fn size_stays_odd() {
        let mut roi = RoiState::new(0, 0, 73);
        for d in [2, 2, -2, 2, -2, -2, -2] {
            roi.resize(d);
            assert_eq!(roi.size % 2, 1);
        }
        for _ in 0..100 {
            roi.resize(-2);
        }
        assert_eq!(roi.size, 1);
        assert_eq!(RoiState::new(0, 0, 10).size, 11);
    }

    #[test]
    fn follow_only_when_active() {
        let mut roi = RoiState::new(5, 5, 3);
        assert!(!roi.follow(9, 9));
        assert_eq!((roi.center_x, roi.center_y), (5, 5));
        roi.cycle(false, 6, 7);
        assert_eq!((roi.center_x, roi.center_y), (6, 7));
        assert!(roi.follow(9, 9));
        assert_eq!((roi.center_x, roi.center_y), (9, 9));
    }

    #[test]
    fn patch_is_centered_on_roi_center() {
        let roi = RoiState::new(10, 20, 5);
        assert_eq!(roi.window_pos(0, 0), (8, 18));
        assert_eq!(roi.window_pos(2, 2), (10, 20));
        assert_eq!(roi.window_pos(4, 4), (12, 22));
    }

    #[test]
    fn extraction_uses_raw_evaluator_output() {
        let src = FnSource::new(100, 100, 1, |_, x, y, _| (x.floor() + 1000.0 * y.floor()) as f32);
        let view = ViewState { contrast_gain: 9.0, ..Default::default() };
        let roi = RoiState::new(50, 60, 3);
        let mut engine = RoiEngine::new();
        let p = engine.extract(&src, &view, &roi);
        assert_eq!(p.pixel(1, 1), [60050.0; 3]);
        assert_eq!(p.pixel(0, 0), [59049.0; 3]);
    }

    #[test]
    fn raw_fourier_of_constant_patch_peaks_at_center() {
        let mut engine = RoiEngine::new();
        let n = 7;
        let mut patch = Patch::zeros(n);
        patch.data.iter_mut().for_each(|v| *v = 10.0);
        let out = engine.transform(RoiMode::RawFourier, &patch).unwrap();
        let c = out.pixel(n / 2, n / 2);
        for y in 0..n {
            for x in 0..n {
                if (x, y) != (n / 2, n / 2) {
                    assert!(out.pixel(x, y)[0] < c[0]);
                }
            }
        }
        assert!(engine.transform(RoiMode::Off, &patch).is_none());
    }

    #[test]
    fn dft_window_removes_the_seam_of_a_ramp() {
        // A ramp has a strong seam; its raw spectrum leaks energy along the axis,
        // the periodic component's spectrum does not.
        let n = 15;
        let mut patch = Patch::zeros(n);
        for y in 0..n {
            for x in 0..n {
                patch.set_pixel(x, y, [10.0 * x as f32; 3]);
            }
        }
        let mut engine = RoiEngine::new();
        let raw = engine.transform(RoiMode::RawFourier, &patch).unwrap();
        let win = engine.transform(RoiMode::DftWindow, &patch).unwrap();
        let far = (n - 1, n / 2); // highest horizontal frequency
        assert!(win.pixel(far.0, far.1)[0] < raw.pixel(far.0, far.1)[0]);
    }

    #[test]
    fn pp_smooth_shows_the_smooth_component() {
        let n = 15;
        let mut patch = Patch::zeros(n);
        for y in 0..n {
            for x in 0..n {
                patch.set_pixel(x, y, [x as f32; 3]);
            }
        }
        let mut engine = RoiEngine::new();
        let out = engine.transform(RoiMode::PpSmooth, &patch).unwrap();
        let (periodic, smooth) = ppsmooth::decompose_patch(&mut Fft2d::new(), &patch);
        for (a, b) in out.data.iter().zip(&smooth.data) {
            assert!((a - b).abs() < 1e-4);
        }
        assert!(out.data.iter().zip(&periodic.data).any(|(a, b)| (a - b).abs() > 1.0));

        // the smooth part carries the left/right seam of the ramp
        let y = n / 2;
        let seam = |p: &Patch| (p.pixel(n - 1, y)[0] - p.pixel(0, y)[0]).abs();
        assert!(seam(&out) > n as f32 / 2.0);
        assert!(seam(&out) > seam(&periodic));
    }

    #[test]
    fn blit_clips_to_window() {
        let mut frame = FrameBuffer::new(4, 4);
        let view = ViewState::default();
        let roi = RoiState::new(0, 0, 3);
        let mut patch = Patch::zeros(3);
        patch.data.iter_mut().for_each(|v| *v = 200.0);
        blit(&mut frame, &view, &roi, &patch);
        assert_eq!(frame.get(0, 0), [200; 3]);
        assert_eq!(frame.get(1, 1), [200; 3]);
        assert_eq!(frame.get(2, 2), [0; 3]);
    }
}
