// src/cv/contours.rs
//
// Suzuki border following over a zero-padded copy of a binary mask.
// Returns every traced border (outer and hole), like a flat retrieval
// list; callers filter by area.

use super::geometry::{self, min_area_rect};
use super::{Point, PointF, Rect};
use crate::segmentation::mask::Mask;

/// Offsets for an 8-connected neighborhood sweep, counter-clockwise.
const NEIGHBORHOOD: [[i32; 2]; 8] = [
    [1, 0],
    [1, -1],
    [0, -1],
    [-1, -1],
    [-1, 0],
    [-1, 1],
    [0, 1],
    [1, 1],
];

/// One traced boundary and its derived scalars. Immutable after extraction.
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<Point>,
    pub hole: bool,
}

impl Contour {
    /// Enclosed area by the shoelace formula over the traced boundary.
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        let mut twice_area: i64 = 0;
        for i in 0..self.points.len() {
            let p = self.points[i];
            let q = self.points[(i + 1) % self.points.len()];
            twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
        }
        (twice_area.abs() as f64) / 2.0
    }

    pub fn bounding_box(&self) -> Rect {
        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;
        for p in &self.points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Rect {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }

    /// Corners of the minimum-area rotated rectangle around the contour.
    pub fn min_area_rect(&self) -> [PointF; 4] {
        min_area_rect(&geometry::convex_hull(&self.points))
    }
}

fn neighborhood_deltas(row_width: i32) -> [i32; 16] {
    let mut deltas = [0i32; 16];
    for i in 0..8 {
        let delta = NEIGHBORHOOD[i][0] + NEIGHBORHOOD[i][1] * row_width;
        deltas[i] = delta;
        deltas[i + 8] = delta;
    }
    deltas
}

fn trace_border(
    grid: &mut [i32],
    pos: usize,
    nbd: i32,
    mut point: Point,
    hole: bool,
    deltas: &[i32; 16],
) -> Contour {
    let mut contour = Contour {
        points: Vec::new(),
        hole,
    };

    let mut s: usize = if hole { 0 } else { 4 };
    let mut s_end = s;
    let mut pos1;

    loop {
        s = s.wrapping_sub(1) & 7;
        pos1 = (pos as isize + deltas[s] as isize) as usize;
        if grid[pos1] != 0 || s == s_end {
            break;
        }
    }

    if grid[pos1] == 0 {
        // Isolated pixel.
        grid[pos] = -nbd;
        contour.points.push(point);
        return contour;
    }

    let mut pos3 = pos;
    loop {
        s_end = s;
        let mut pos4;
        loop {
            s = (s + 1) & 15;
            pos4 = (pos3 as isize + deltas[s] as isize) as usize;
            if grid[pos4] != 0 {
                break;
            }
        }
        s &= 7;

        if (s.wrapping_sub(1) as u32) < s_end as u32 {
            grid[pos3] = -nbd;
        } else if grid[pos3] == 1 {
            grid[pos3] = nbd;
        }

        contour.points.push(point);
        point.x += NEIGHBORHOOD[s][0];
        point.y += NEIGHBORHOOD[s][1];

        if pos4 == pos && pos3 == pos1 {
            break;
        }
        pos3 = pos4;
        s = (s + 4) & 7;
    }

    contour
}

/// Extract all boundary contours from a binary mask.
pub fn find_contours(mask: &Mask) -> Vec<Contour> {
    let width = mask.width;
    let height = mask.height;
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let row_width = width + 2;
    let mut grid = vec![0i32; row_width * (height + 2)];
    for y in 0..height {
        for x in 0..width {
            grid[(y + 1) * row_width + x + 1] = i32::from(mask.get(x, y));
        }
    }

    let deltas = neighborhood_deltas(row_width as i32);
    let mut contours = Vec::new();
    let mut nbd = 1;
    let mut pos = row_width + 1;

    for y in 0..height {
        for x in 0..width {
            let pix = grid[pos];
            if pix != 0 {
                let outer = pix == 1 && grid[pos - 1] == 0;
                let hole = !outer && pix >= 1 && grid[pos + 1] == 0;
                if outer || hole {
                    nbd += 1;
                    let start = Point::new(x as i32, y as i32);
                    contours.push(trace_border(&mut grid, pos, nbd, start, hole, &deltas));
                }
            }
            pos += 1;
        }
        pos += 2;
    }

    contours
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
    fn empty_mask_has_no_contours() {
        assert!(find_contours(&Mask::new(16, 16)).is_empty());
    }

    #[test]
    fn single_block_traces_one_outer_border() {
        let mask = block(20, 20, 5, 5, 8, 6);
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert!(!contours[0].hole);

        let bbox = contours[0].bounding_box();
        assert_eq!((bbox.x, bbox.y), (5, 5));
        assert_eq!((bbox.width, bbox.height), (8, 6));
        // Boundary trace runs through pixel centers: (w-1) * (h-1).
        assert_eq!(contours[0].area(), 7.0 * 5.0);
    }

    #[test]
    fn two_blocks_trace_separately() {
        let mut mask = block(30, 30, 2, 2, 5, 5);
        for y in 20..25 {
            for x in 20..25 {
                mask.set(x, y, true);
            }
        }
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 2);
    }

    #[test]
    fn ring_yields_outer_and_hole_border() {
        let mut mask = block(20, 20, 4, 4, 10, 10);
        for y in 7..11 {
            for x in 7..11 {
                mask.set(x, y, false);
            }
        }
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 2);
        assert!(contours.iter().any(|c| c.hole));
        assert!(contours.iter().any(|c| !c.hole));
    }

    #[test]
    fn isolated_pixel_is_a_degenerate_contour() {
        let mut mask = Mask::new(10, 10);
        mask.set(3, 3, true);
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points.len(), 1);
        assert_eq!(contours[0].area(), 0.0);
    }
}
