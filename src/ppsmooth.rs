//! Periodic plus smooth decomposition of a square patch.
//!
//! `u = p + s`, where `s` is the zero-mean solution of the periodic Poisson
//! problem `Δs = v` whose right-hand side `v` holds the jumps of `u` across
//! opposite edges. `p` then carries the image content without the seam the
//! DFT would otherwise see when it wraps the patch around.

use rustfft::num_complex::Complex32;

use crate::fourier::Fft2d;
use crate::types::Patch;

pub struct Decomposition {
    pub periodic: Vec<f32>,
    pub smooth: Vec<f32>,
}

/// Boundary image: opposite-edge differences, added on one edge and removed on the other.
fn boundary_image(u: &[f32], n: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; n * n];
    let last = n - 1;
    for j in 0..n {
        let a = u[j * n + last] - u[j * n];
        v[j * n] += a;
        v[j * n + last] -= a;
    }
    for i in 0..n {
        let b = u[last * n + i] - u[i];
        v[i] += b;
        v[last * n + i] -= b;
    }
    v
}

/// Decompose one `n x n` plane.
pub fn decompose(fft: &mut Fft2d, u: &[f32], n: usize) -> Decomposition {
    debug_assert_eq!(u.len(), n * n);
    if n == 0 {
        return Decomposition { periodic: Vec::new(), smooth: Vec::new() };
    }

    let v = boundary_image(u, n);
    let mut buf: Vec<Complex32> = v.iter().map(|&x| Complex32::new(x, 0.0)).collect();
    fft.forward(&mut buf, n);

    // eigenvalues of the periodic 5-point Laplacian
    let cosines: Vec<f32> = (0..n)
        .map(|k| 2.0 * (2.0 * std::f64::consts::PI * k as f64 / n as f64).cos() as f32)
        .collect();
    for r in 0..n {
        for q in 0..n {
            let idx = r * n + q;
            if q == 0 && r == 0 {
                buf[idx] = Complex32::new(0.0, 0.0);
                continue;
            }
            let denom = cosines[q] + cosines[r] - 4.0;
            buf[idx] /= denom;
        }
    }

    fft.inverse(&mut buf, n);
    let norm = 1.0 / (n * n) as f32;
    let smooth: Vec<f32> = buf.iter().map(|c| c.re * norm).collect();
    let periodic = u.iter().zip(&smooth).map(|(&a, &s)| a - s).collect();
    Decomposition { periodic, smooth }
}

/// Decompose every channel of an RGB patch. Returns `(periodic, smooth)`.
pub fn decompose_patch(fft: &mut Fft2d, patch: &Patch) -> (Patch, Patch) {
    let n = patch.size;
    let planes = patch.to_planar();
    let mut periodic: [Vec<f32>; 3] = Default::default();
    let mut smooth: [Vec<f32>; 3] = Default::default();
    for (c, plane) in planes.iter().enumerate() {
        let d = decompose(fft, plane, n);
        periodic[c] = d.periodic;
        smooth[c] = d.smooth;
    }
    (Patch::from_planar(n, &periodic), Patch::from_planar(n, &smooth))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizontal_jump(plane: &[f32], n: usize, row: usize) -> f32 {
        plane[row * n + n - 1] - plane[row * n]
    }

    fn vertical_jump(plane: &[f32], n: usize, col: usize) -> f32 {
        plane[(n - 1) * n + col] - plane[col]
    }

    #[test]
    fn constant_patch_has_no_smooth_part() {
        let n = 7;
        let mut fft = Fft2d::new();
        let d = decompose(&mut fft, &vec![42.0; n * n], n);
        for (&p, &s) in d.periodic.iter().zip(&d.smooth) {
            assert!(s.abs() < 1e-4);
            assert!((p - 42.0).abs() < 1e-4);
        }
    }

    #[test]
    fn parts_sum_back_to_patch_and_smooth_has_zero_mean() {
        let n = 11;
        let u: Vec<f32> = (0..n * n).map(|k| ((k * 37) % 101) as f32).collect();
        let mut fft = Fft2d::new();
        let d = decompose(&mut fft, &u, n);
        for k in 0..n * n {
            assert!((d.periodic[k] + d.smooth[k] - u[k]).abs() < 1e-3);
        }
        let mean: f32 = d.smooth.iter().sum::<f32>() / (n * n) as f32;
        assert!(mean.abs() < 1e-3, "mean = {mean}");
    }

    #[test]
    fn smooth_part_carries_the_edge_jump_of_a_ramp() {
        // u = x: jump of n-1 between left and right column, none vertically.
        let n = 9;
        let u: Vec<f32> = (0..n * n).map(|k| (k % n) as f32).collect();
        let mut fft = Fft2d::new();
        let d = decompose(&mut fft, &u, n);
        let expected_periodic_jump = (n - 1) as f32 / n as f32;
        for row in 0..n {
            let ju = horizontal_jump(&u, n, row);
            let jp = horizontal_jump(&d.periodic, n, row);
            let js = horizontal_jump(&d.smooth, n, row);
            assert!((jp - expected_periodic_jump).abs() < 1e-3, "row {row}: {jp}");
            // the seam left in the periodic part is below one interior step
            assert!(jp.abs() < 1.0);
            assert!((js - ju).abs() < 1.0);
        }
        for col in 0..n {
            assert!(vertical_jump(&d.periodic, n, col).abs() < 1e-3);
            assert!(vertical_jump(&d.smooth, n, col).abs() < 1e-3);
        }
    }

    #[test]
    fn periodic_part_of_a_ramp_is_much_flatter() {
        let n = 15;
        let u: Vec<f32> = (0..n * n).map(|k| 3.0 * (k / n) as f32 + 2.0 * (k % n) as f32).collect();
        let mut fft = Fft2d::new();
        let d = decompose(&mut fft, &u, n);
        let range = |v: &[f32]| {
            let lo = v.iter().cloned().fold(f32::INFINITY, f32::min);
            let hi = v.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            hi - lo
        };
        assert!(range(&d.periodic) < 0.2 * range(&u));
    }

    #[test]
    fn patch_channels_are_decomposed_independently() {
        let n = 5;
        let mut patch = Patch::zeros(n);
        for y in 0..n {
            for x in 0..n {
                patch.set_pixel(x, y, [10.0, x as f32, y as f32]);
            }
        }
        let mut fft = Fft2d::new();
        let (p, s) = decompose_patch(&mut fft, &patch);
        for y in 0..n {
            for x in 0..n {
                assert!(s.pixel(x, y)[0].abs() < 1e-4);
                assert!((p.pixel(x, y)[0] - 10.0).abs() < 1e-4);
            }
        }
        // the x-ramp only jumps horizontally, the y-ramp only vertically
        assert!((s.pixel(n - 1, 2)[1] - s.pixel(0, 2)[1]).abs() > 1.0);
        assert!((s.pixel(2, n - 1)[1] - s.pixel(2, 0)[1]).abs() < 1e-3);
        assert!((s.pixel(2, n - 1)[2] - s.pixel(2, 0)[2]).abs() > 1.0);
    }
}
