//! Per-frame composition of the window contents.
//!
//! Every call repaints the whole frame from the current view: resampled
//! image, value labels on strongly magnified pixels, then the ROI on top.

use crate::draw::{GLYPH_ADVANCE, draw_text};
use crate::pixel;
use crate::roi::{RoiEngine, RoiState};
use crate::source::PyramidSource;
use crate::types::{FrameBuffer, Rgb, pack_rgb};
use crate::view::ViewState;

const LABEL_FG: u32 = 0x00_00_FF_00;
const LABEL_BG: u32 = 0x00_00_00_00;

pub struct Compositor {
    roi: RoiEngine,
    label_zoom_threshold: f64,
}

impl Compositor {
    pub fn new(label_zoom_threshold: f64) -> Self {
        Self { roi: RoiEngine::new(), label_zoom_threshold }
    }

    pub fn render<S: PyramidSource + ?Sized>(
        &mut self,
        frame: &mut FrameBuffer,
        src: &S,
        view: &ViewState,
        roi: &RoiState,
    ) {
        resample(frame, src, view);
        if view.zoom_factor > self.label_zoom_threshold {
            draw_value_labels(frame, src, view);
        }
        self.roi.render(frame, src, view, roi);
        tracing::trace!("rendered {}x{} at zoom {}", frame.width, frame.height, view.zoom_factor);
    }
}

/// Fill every window pixel with the contrast-mapped image value it covers.
pub fn resample<S: PyramidSource + ?Sized>(frame: &mut FrameBuffer, src: &S, view: &ViewState) {
    let width = frame.width;
    for (j, row) in frame.pixels.chunks_exact_mut(width.max(1)).enumerate() {
        for (i, px) in row.iter_mut().enumerate() {
            let (ix, iy) = view.window_to_image(i as f64, j as f64);
            let rgb = pixel::evaluate(src, view.zoom_factor, ix, iy);
            *px = pack_rgb(view.map_rgb(rgb));
        }
    }
}

/// Write the value of each magnified image pixel at the center of its cell.
fn draw_value_labels<S: PyramidSource + ?Sized>(frame: &mut FrameBuffer, src: &S, view: &ViewState) {
    let zoom = view.zoom_factor;
    // first image pixel center at or right of / below the window origin
    let (px, py) = view.window_to_image(0.0, 0.0);
    let (x0, y0) = view.image_to_window(px.ceil() + 0.5, py.ceil() + 0.5);
    let (w, h) = (frame.width as f64, frame.height as f64);

    let mut jj = y0 as f64;
    while jj < h - zoom {
        let mut ii = x0 as f64;
        while ii < w - zoom {
            let (x, y) = (ii as i32, jj as i32);
            let (ix, iy) = view.window_to_image(x as f64, y as f64);
            let text = value_label(pixel::evaluate(src, zoom, ix, iy));
            let half = text.chars().count() as i32 * GLYPH_ADVANCE / 2;
            draw_text(frame, x - half, y, LABEL_FG, Some(LABEL_BG), &text);
            ii += zoom;
        }
        jj += zoom;
    }
}

/// One number for gray pixels, three space-separated numbers otherwise.
pub fn value_label(rgb: Rgb) -> String {
    if rgb[0] == rgb[1] && rgb[0] == rgb[2] {
        format_g(rgb[0])
    } else {
        format!("{} {} {}", format_g(rgb[0]), format_g(rgb[1]), format_g(rgb[2]))
    }
}

/// Compact number: six significant digits, trailing zeros dropped,
/// exponent form for very large or very small magnitudes.
pub fn format_g(v: f32) -> String {
    if v.is_nan() {
        return "nan".into();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".into() } else { "-inf".into() };
    }
    if v == 0.0 {
        return "0".into();
    }
    // exponent after rounding to six significant digits
    let sci = format!("{:.5e}", v);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    if !(-4..6).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs());
    }
    let decimals = (5 - exp) as usize;
    trim_zeros(&format!("{:.*}", decimals, v)).to_string()
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') { s.trim_end_matches('0').trim_end_matches('.') } else { s }
}
