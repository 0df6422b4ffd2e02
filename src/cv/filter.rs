// src/cv/filter.rs

use super::GrayImage;
use crate::types::Frame;

/// BT.601 luma, integer arithmetic.
pub fn rgb_to_gray(frame: &Frame) -> GrayImage {
    let mut gray = GrayImage::new(frame.width, frame.height);
    for (i, out) in gray.data.iter_mut().enumerate() {
        let idx = i * 3;
        let r = frame.data[idx] as u32;
        let g = frame.data[idx + 1] as u32;
        let b = frame.data[idx + 2] as u32;
        *out = ((299 * r + 587 * g + 114 * b) / 1000) as u8;
    }
    gray
}

/// 5x5 Gaussian blur, separable [1 4 6 4 1]/16 passes, edges clamped.
pub fn gaussian_blur5(src: &GrayImage) -> GrayImage {
    const KERNEL: [u32; 5] = [1, 4, 6, 4, 1];
    let width = src.width as isize;
    let height = src.height as isize;

    let mut tmp = GrayImage::new(src.width, src.height);
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0u32;
            for (k, &weight) in KERNEL.iter().enumerate() {
                let sx = (x + k as isize - 2).clamp(0, width - 1);
                acc += weight * src.data[(y * width + sx) as usize] as u32;
            }
            tmp.data[(y * width + x) as usize] = (acc / 16) as u8;
        }
    }

    let mut dst = GrayImage::new(src.width, src.height);
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0u32;
            for (k, &weight) in KERNEL.iter().enumerate() {
                let sy = (y + k as isize - 2).clamp(0, height - 1);
                acc += weight * tmp.data[(sy * width + x) as usize] as u32;
            }
            dst.data[(y * width + x) as usize] = (acc / 16) as u8;
        }
    }
    dst
}

/// Sobel x/y gradients; the one-pixel border is left at zero.
pub fn sobel(src: &GrayImage) -> (Vec<i32>, Vec<i32>) {
    let width = src.width;
    let height = src.height;
    let mut gx = vec![0i32; width * height];
    let mut gy = vec![0i32; width * height];
    if width < 3 || height < 3 {
        return (gx, gy);
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let p = |dx: isize, dy: isize| {
                src.data[((y as isize + dy) as usize) * width + (x as isize + dx) as usize] as i32
            };
            gx[y * width + x] =
                -p(-1, -1) - 2 * p(-1, 0) - p(-1, 1) + p(1, -1) + 2 * p(1, 0) + p(1, 1);
            gy[y * width + x] =
                -p(-1, -1) - 2 * p(0, -1) - p(1, -1) + p(-1, 1) + 2 * p(0, 1) + p(1, 1);
        }
    }
    (gx, gy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_of_uniform_frame_is_uniform() {
        let frame = Frame::from_rgb(vec![100u8; 8 * 8 * 3], 8, 8, 0).unwrap();
        let gray = rgb_to_gray(&frame);
        assert!(gray.data.iter().all(|&v| v == 100));
    }

    #[test]
    fn blur_preserves_uniform_regions() {
        let mut img = GrayImage::new(16, 16);
        img.data.fill(200);
        let blurred = gaussian_blur5(&img);
        assert!(blurred.data.iter().all(|&v| (v as i32 - 200).abs() <= 1));
    }

    #[test]
    fn blur_softens_impulse() {
        let mut img = GrayImage::new(9, 9);
        img.data[4 * 9 + 4] = 255;
        let blurred = gaussian_blur5(&img);
        assert!(blurred.at(4, 4) < 255);
        assert!(blurred.at(5, 4) > 0);
    }

    #[test]
    fn sobel_finds_vertical_edge() {
        let mut img = GrayImage::new(10, 10);
        for y in 0..10 {
            for x in 5..10 {
                img.data[y * 10 + x] = 255;
            }
        }
        let (gx, gy) = sobel(&img);
        assert!(gx[5 * 10 + 5].abs() > 0);
        assert_eq!(gy[5 * 10 + 5], 0);
    }
}
