//! Square 2D discrete Fourier transforms and the log-magnitude display.
//!
//! Transforms are unnormalized in both directions (`inverse(forward(x)) = n*n*x`),
//! computed as row FFTs, a transpose, row FFTs again and a transpose back.

use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftDirection, FftPlanner};

/// Plans are cached by the planner, so one `Fft2d` should live as long as the viewer.
pub struct Fft2d {
    planner: FftPlanner<f32>,
}

impl Default for Fft2d {
    fn default() -> Self {
        Self::new()
    }
}

impl Fft2d {
    pub fn new() -> Self {
        Self { planner: FftPlanner::new() }
    }

    pub fn forward(&mut self, buf: &mut [Complex32], n: usize) {
        self.process(buf, n, FftDirection::Forward);
    }

    pub fn inverse(&mut self, buf: &mut [Complex32], n: usize) {
        self.process(buf, n, FftDirection::Inverse);
    }

    fn process(&mut self, buf: &mut [Complex32], n: usize, direction: FftDirection) {
        debug_assert_eq!(buf.len(), n * n);
        if n == 0 {
            return;
        }
        let fft = self.planner.plan_fft(n, direction);
        // `process` runs on every consecutive chunk of length n, i.e. every row
        fft.process(buf);
        transpose_in_place(buf, n);
        fft.process(buf);
        transpose_in_place(buf, n);
    }

    /// Centered log-magnitude spectrum of an `n x n` real plane.
    pub fn log_spectrum(&mut self, plane: &[f32], n: usize) -> Vec<f32> {
        let mut buf: Vec<Complex32> = plane.iter().map(|&v| Complex32::new(v, 0.0)).collect();
        self.forward(&mut buf, n);
        let logs: Vec<f32> = buf.iter().map(|c| log_magnitude(c.norm())).collect();
        quadrant_swap(&logs, n)
    }
}

fn transpose_in_place(buf: &mut [Complex32], n: usize) {
    for j in 0..n {
        for i in (j + 1)..n {
            buf.swap(j * n + i, i * n + j);
        }
    }
}

/// Display value of a spectral magnitude: `255 * (ln(|F| / 255) + 0.5) / 5`.
/// A zero magnitude is floored at the smallest positive float, giving a large negative value.
#[inline]
pub fn log_magnitude(mag: f32) -> f32 {
    let m = mag.max(f32::MIN_POSITIVE);
    255.0 * ((m / 255.0).ln() + 0.5) / 5.0
}

/// Move bin `(i, j)` to `((i + n/2) mod n, (j + n/2) mod n)`, so the zero
/// frequency lands on the center pixel `(n/2, n/2)`.
pub fn quadrant_swap(src: &[f32], n: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; n * n];
    let h = n / 2;
    for j in 0..n {
        let jj = (j + h) % n;
        for i in 0..n {
            let ii = (i + h) % n;
            out[jj * n + ii] = src[j * n + i];
        }
    }
    out
}
