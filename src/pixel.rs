// Evaluation of the image at a real image-space point.

use crate::config::MAX_PYRAMID_LEVELS;
use crate::source::PyramidSource;
use crate::types::Rgb;

/// Returned left of / above the image.
pub const BEFORE_IMAGE: Rgb = [127.0; 3];
/// Returned right of / below the image.
pub const AFTER_IMAGE: Rgb = [0.0; 3];

/// Pyramid octave that matches a zoom level: `round(log2(1 / zoom))` when zoomed out.
pub fn select_octave(zoom_factor: f64) -> usize {
    if zoom_factor >= 1.0 {
        return 0;
    }
    let s = (1.0 / zoom_factor).log2().round();
    // NaN and negatives fall to 0 through the saturating cast
    (s as usize).min(MAX_PYRAMID_LEVELS - 1)
}

/// Map 1, 2 or 3+ source channels onto display RGB.
pub fn expand_to_rgb(vec: &[f32]) -> Rgb {
    match vec.len() {
        0 => [f32::NAN; 3],
        1 => [vec[0]; 3],
        2 => [vec[0], vec[1], vec[1]],
        _ => [vec[0], vec[1], vec[2]],
    }
}

/// Value of the image at `(ix, iy)` as seen at `zoom_factor`.
///
/// Points with a negative coordinate yield [`BEFORE_IMAGE`]; points at or past
/// the far edge yield [`AFTER_IMAGE`].
pub fn evaluate<S: PyramidSource + ?Sized>(src: &S, zoom_factor: f64, ix: f64, iy: f64) -> Rgb {
    if ix < 0.0 || iy < 0.0 {
        return BEFORE_IMAGE;
    }
    if ix >= src.width() as f64 || iy >= src.height() as f64 {
        return AFTER_IMAGE;
    }

    let octave = select_octave(zoom_factor);
    let scale = (1u64 << octave) as f64;
    let (p, q) = (ix / scale, iy / scale);

    let mut vec = [0.0f32; 3];
    let n = src.channels().min(3);
    for (c, v) in vec.iter_mut().enumerate().take(n) {
        *v = src.sample(octave, p, q, c);
    }
    expand_to_rgb(&vec[..n])
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    /// In-memory source whose value is a function of position; records requested octaves.
    pub(crate) struct FnSource<F: Fn(usize, f64, f64, usize) -> f32> {
        pub width: usize,
        pub height: usize,
        pub channels: usize,
        pub f: F,
        pub octaves: RefCell<Vec<usize>>,
    }

    impl<F: Fn(usize, f64, f64, usize) -> f32> FnSource<F> {
        pub fn new(width: usize, height: usize, channels: usize, f: F) -> Self {
            Self { width, height, channels, f, octaves: RefCell::new(Vec::new()) }
        }
    }

    impl<F: Fn(usize, f64, f64, usize) -> f32> PyramidSource for FnSource<F> {
        fn width(&self) -> usize {
            self.width
        }
        fn height(&self) -> usize {
            self.height
        }
        fn channels(&self) -> usize {
            self.channels
        }
        fn sample(&self, octave: usize, x: f64, y: f64, channel: usize) -> f32 {
            self.octaves.borrow_mut().push(octave);
            (self.f)(octave, x, y, channel)
        }
    }

    #[test]
    fn octave_for_power_of_two_zoom() {
        for k in 0..40u32 {
            let zoom = 2f64.powi(-(k as i32));
            assert_eq!(select_octave(zoom), (k as usize).min(MAX_PYRAMID_LEVELS - 1), "k = {k}");
        }
        assert_eq!(select_octave(3.0), 0);
        assert_eq!(select_octave(0.7), 1); // log2(1/0.7) = 0.51
    }

    #[test]
    fn out_of_image_conventions() {
        let src = FnSource::new(10, 8, 3, |_, _, _, _| 42.0);
        for &zoom in &[0.1, 1.0, 60.0] {
            assert_eq!(evaluate(&src, zoom, -0.01, 3.0), BEFORE_IMAGE);
            assert_eq!(evaluate(&src, zoom, 3.0, -5.0), BEFORE_IMAGE);
            assert_eq!(evaluate(&src, zoom, 10.0, 3.0), AFTER_IMAGE);
            assert_eq!(evaluate(&src, zoom, 3.0, 8.0), AFTER_IMAGE);
            // negative wins over far side
            assert_eq!(evaluate(&src, zoom, -1.0, 100.0), BEFORE_IMAGE);
        }
        assert!(src.octaves.borrow().is_empty());
    }

    #[test]
    fn channel_expansion() {
        assert_eq!(expand_to_rgb(&[5.0]), [5.0, 5.0, 5.0]);
        assert_eq!(expand_to_rgb(&[5.0, 9.0]), [5.0, 9.0, 9.0]);
        assert_eq!(expand_to_rgb(&[1.0, 2.0, 3.0, 4.0]), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn coordinates_are_scaled_to_the_octave() {
        let src = FnSource::new(256, 256, 4, |_, x, y, c| (x + 1000.0 * y) as f32 + c as f32 * 0.25);
        let rgb = evaluate(&src, 0.25, 100.0, 40.0);
        assert_eq!(rgb, [10025.0, 10025.25, 10025.5]);
        assert!(src.octaves.borrow().iter().all(|&o| o == 2));
        assert_eq!(src.octaves.borrow().len(), 3);
    }
}
