// src/segmentation/mask.rs

/// Binary raster for one color class. Pixels are 0 or 255 so that region
/// means compare directly against the 8-bit coverage thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl Mask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0; width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x] != 0
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        self.data[y * self.width + x] = if on { 255 } else { 0 };
    }

    /// Mean over the whole mask, 0.0 for an empty raster.
    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.data.iter().map(|&v| v as u64).sum();
        sum as f64 / self.data.len() as f64
    }

    /// Mean over `[x0, x1) x [y0, y1)`, clamped to the raster. Returns
    /// `None` when the clamped region is empty — degenerate sampling
    /// geometry reads as "no reading", never as a fault.
    pub fn mean_rect(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> Option<f64> {
        let x0 = x0.clamp(0, self.width as i32) as usize;
        let y0 = y0.clamp(0, self.height as i32) as usize;
        let x1 = x1.clamp(0, self.width as i32) as usize;
        let y1 = y1.clamp(0, self.height as i32) as usize;
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let mut sum: u64 = 0;
        for y in y0..y1 {
            let row = &self.data[y * self.width + x0..y * self.width + x1];
            sum += row.iter().map(|&v| v as u64).sum::<u64>();
        }
        Some(sum as f64 / ((x1 - x0) * (y1 - y0)) as f64)
    }

    /// Zero every pixel in `[x0, x1) x [y0, y1)`, clamped to the raster.
    pub fn zero_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        let x0 = x0.clamp(0, self.width as i32) as usize;
        let y0 = y0.clamp(0, self.height as i32) as usize;
        let x1 = x1.clamp(0, self.width as i32) as usize;
        let y1 = y1.clamp(0, self.height as i32) as usize;
        for y in y0..y1 {
            self.data[y * self.width + x0..y * self.width + x1].fill(0);
        }
    }

    /// Zero a filled disc, clamped to the raster.
    pub fn zero_circle(&mut self, cx: i32, cy: i32, r: i32) {
        let r2 = (r as i64) * (r as i64);
        let y0 = (cy - r).clamp(0, self.height as i32);
        let y1 = (cy + r + 1).clamp(0, self.height as i32);
        let x0 = (cx - r).clamp(0, self.width as i32);
        let x1 = (cx + r + 1).clamp(0, self.width as i32);
        for y in y0..y1 {
            let dy = (y - cy) as i64;
            for x in x0..x1 {
                let dx = (x - cx) as i64;
                if dx * dx + dy * dy <= r2 {
                    self.data[y as usize * self.width + x as usize] = 0;
                }
            }
        }
    }

    /// Clear every pixel that is set in `other` (set subtraction).
    pub fn subtract(&mut self, other: &Mask) {
        debug_assert_eq!(self.data.len(), other.data.len());
        for (dst, &src) in self.data.iter_mut().zip(other.data.iter()) {
            if src != 0 {
                *dst = 0;
            }
        }
    }
}
