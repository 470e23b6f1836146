// Core buffers shared by the compositor and the ROI engine.

/// One evaluated image-space sample expanded to three display channels.
pub type Rgb = [f32; 3];

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // window width (pixels)
    pub height: usize,     // window height (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Reallocate for a new window size. Contents are undefined until the next render.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.resize(width * height, 0);
    }

    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub fn put(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let idx = y * self.width + x;
        self.pixels[idx] = pack_rgb(rgb);
    }

    #[cfg(test)]
    pub fn get(&self, x: usize, y: usize) -> [u8; 3] {
        unpack_rgb(self.pixels[y * self.width + x])
    }
}

#[inline]
pub fn pack_rgb([r, g, b]: [u8; 3]) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub fn unpack_rgb(px: u32) -> [u8; 3] {
    [((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8]
}

/// Square `size x size` RGB float patch, interleaved (`3 * (y * size + x) + c`).
/// Lives for one render pass of the ROI.
#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    pub size: usize,
    pub data: Vec<f32>,
}

impl Patch {
    pub fn zeros(size: usize) -> Self {
        Self { size, data: vec![0.0; 3 * size * size] }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        let i = 3 * (y * self.size + x);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: Rgb) {
        let i = 3 * (y * self.size + x);
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Split into three channel-major planes of `size * size` samples each.
    pub fn to_planar(&self) -> [Vec<f32>; 3] {
        let n = self.size * self.size;
        let mut planes = [vec![0.0; n], vec![0.0; n], vec![0.0; n]];
        for (i, px) in self.data.chunks_exact(3).enumerate() {
            for (plane, &v) in planes.iter_mut().zip(px) {
                plane[i] = v;
            }
        }
        planes
    }

    /// Inverse of [`Patch::to_planar`].
    pub fn from_planar(size: usize, planes: &[Vec<f32>; 3]) -> Self {
        let mut out = Self::zeros(size);
        for (i, px) in out.data.chunks_exact_mut(3).enumerate() {
            for (dst, plane) in px.iter_mut().zip(planes) {
                *dst = plane[i];
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_rgb() {
        let px = pack_rgb([0x12, 0x34, 0x56]);
        assert_eq!(px, 0x00_12_34_56);
        assert_eq!(unpack_rgb(px), [0x12, 0x34, 0x56]);
    }

    #[test]
    fn planar_split_keeps_channels_apart() {
        let mut p = Patch::zeros(3);
        p.set_pixel(1, 2, [1.0, 2.0, 3.0]);
        let planes = p.to_planar();
        assert_eq!(planes[0][2 * 3 + 1], 1.0);
        assert_eq!(planes[1][2 * 3 + 1], 2.0);
        assert_eq!(planes[2][2 * 3 + 1], 3.0);
        assert_eq!(Patch::from_planar(3, &planes), p);
    }

    #[test]
    fn frame_contains_rejects_negative_and_far_side() {
        let fb = FrameBuffer::new(4, 3);
        assert!(fb.contains(0, 0));
        assert!(fb.contains(3, 2));
        assert!(!fb.contains(-1, 0));
        assert!(!fb.contains(4, 0));
        assert!(!fb.contains(0, 3));
    }
}
