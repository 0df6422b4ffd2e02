// src/segmentation/morphology.rs
//
// 3x3 box-kernel erosion and dilation. The line pipeline erodes less
// than it dilates: erosion removes speckle, the heavier dilation regrows
// the true line wider than speckle could return.

use super::mask::Mask;

fn pass(mask: &Mask, scratch: &mut Mask, erode: bool) {
    let width = mask.width as isize;
    let height = mask.height as isize;
    for y in 0..height {
        for x in 0..width {
            let mut hit = erode;
            'kernel: for dy in -1..=1isize {
                for dx in -1..=1isize {
                    let nx = x + dx;
                    let ny = y + dy;
                    // Outside the raster counts as background.
                    let on = nx >= 0
                        && ny >= 0
                        && nx < width
                        && ny < height
                        && mask.data[(ny * width + nx) as usize] != 0;
                    if erode && !on {
                        hit = false;
                        break 'kernel;
                    }
                    if !erode && on {
                        hit = true;
                        break 'kernel;
                    }
                }
            }
            scratch.data[(y * width + x) as usize] = if hit { 255 } else { 0 };
        }
    }
}

pub fn erode(mask: &mut Mask, iterations: usize) {
    let mut scratch = Mask::new(mask.width, mask.height);
    for _ in 0..iterations {
        pass(mask, &mut scratch, true);
        std::mem::swap(&mut mask.data, &mut scratch.data);
    }
}

pub fn dilate(mask: &mut Mask, iterations: usize) {
    let mut scratch = Mask::new(mask.width, mask.height);
    for _ in 0..iterations {
        pass(mask, &mut scratch, false);
        std::mem::swap(&mut mask.data, &mut scratch.data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(width: usize, height: usize, x0: usize, y0: usize, w: usize, h: usize) -> Mask {
        let mut mask = Mask::new(width, height);
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.set(x, y, true);
            }
        }
        mask
    }

    #[test]
    fn erode_removes_speckle() {
        let mut mask = Mask::new(20, 20);
        mask.set(10, 10, true);
        erode(&mut mask, 1);
        assert_eq!(mask.mean(), 0.0);
    }

    #[test]
    fn erode_shrinks_block_per_iteration() {
        let mut mask = block(30, 30, 10, 10, 10, 10);
        erode(&mut mask, 2);
        assert!(!mask.get(10, 10));
        assert!(!mask.get(11, 11));
        assert!(mask.get(12, 12));
        assert!(mask.get(15, 15));
    }

    #[test]
    fn dilate_grows_block_per_iteration() {
        let mut mask = block(30, 30, 10, 10, 5, 5);
        dilate(&mut mask, 3);
        assert!(mask.get(7, 7));
        assert!(!mask.get(6, 6));
    }

    #[test]
    fn erode_then_heavier_dilate_keeps_wide_region_drops_speckle() {
        let mut mask = block(60, 60, 10, 10, 20, 20);
        mask.set(50, 50, true);
        erode(&mut mask, 2);
        dilate(&mut mask, 4);
        assert!(mask.get(20, 20));
        assert!(!mask.get(50, 50));
    }
}
