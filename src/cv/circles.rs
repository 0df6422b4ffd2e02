// src/cv/circles.rs
//
// Hough-gradient circle detector over a constrained radius band. Edge
// pixels vote along their gradient direction for candidate centers;
// radius comes from the supporting-edge distance histogram.

use super::filter::sobel;
use super::GrayImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Circle {
    pub x: i32,
    pub y: i32,
    pub r: i32,
}

#[derive(Debug, Clone)]
pub struct CircleDetector {
    pub min_radius: u32,
    pub max_radius: u32,
    pub min_center_dist: u32,
    pub gradient_threshold: u32,
    pub accumulator_threshold: u32,
}

impl CircleDetector {
    pub fn detect(&self, gray: &GrayImage) -> Vec<Circle> {
        let width = gray.width;
        let height = gray.height;
        if width < 3 || height < 3 {
            return Vec::new();
        }

        let (gx, gy) = sobel(gray);
        // Sobel responds with 4x the per-pixel step, so scale the threshold.
        let mag_threshold = (self.gradient_threshold as i64 * 4).pow(2);

        let mut edges: Vec<(usize, usize, f32, f32)> = Vec::new();
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let dx = gx[y * width + x] as i64;
                let dy = gy[y * width + x] as i64;
                let mag_sq = dx * dx + dy * dy;
                if mag_sq > mag_threshold {
                    let mag = (mag_sq as f64).sqrt() as f32;
                    edges.push((x, y, dx as f32 / mag, dy as f32 / mag));
                }
            }
        }

        let mut accumulator = vec![0u32; width * height];
        for &(x, y, ux, uy) in &edges {
            for r in self.min_radius..=self.max_radius {
                let rf = r as f32;
                for sign in [-1.0f32, 1.0] {
                    let cx = (x as f32 + sign * ux * rf).round() as i32;
                    let cy = (y as f32 + sign * uy * rf).round() as i32;
                    if cx >= 0 && cy >= 0 && (cx as usize) < width && (cy as usize) < height {
                        accumulator[cy as usize * width + cx as usize] += 1;
                    }
                }
            }
        }

        // Local maxima above the vote floor, strongest first.
        let mut peaks: Vec<(u32, usize, usize)> = Vec::new();
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let votes = accumulator[y * width + x];
                if votes < self.accumulator_threshold {
                    continue;
                }
                let mut is_max = true;
                'window: for ny in y - 1..=y + 1 {
                    for nx in x - 1..=x + 1 {
                        if (nx, ny) != (x, y) && accumulator[ny * width + nx] > votes {
                            is_max = false;
                            break 'window;
                        }
                    }
                }
                if is_max {
                    peaks.push((votes, x, y));
                }
            }
        }
        peaks.sort_by(|a, b| b.0.cmp(&a.0));

        let min_dist_sq = (self.min_center_dist as i64).pow(2);
        let mut circles: Vec<Circle> = Vec::new();
        for &(_, cx, cy) in &peaks {
            let far_enough = circles.iter().all(|c| {
                let dx = c.x as i64 - cx as i64;
                let dy = c.y as i64 - cy as i64;
                dx * dx + dy * dy >= min_dist_sq
            });
            if !far_enough {
                continue;
            }
            if let Some(r) = self.estimate_radius(&edges, cx, cy) {
                circles.push(Circle {
                    x: cx as i32,
                    y: cy as i32,
                    r,
                });
            }
        }
        circles
    }

    /// Most common edge distance in the radius band, counting only edges
    /// whose gradient points radially at the candidate center.
    fn estimate_radius(&self, edges: &[(usize, usize, f32, f32)], cx: usize, cy: usize) -> Option<i32> {
        let band = (self.max_radius - self.min_radius + 1) as usize;
        let mut histogram = vec![0u32; band];

        for &(x, y, ux, uy) in edges {
            let dx = x as f32 - cx as f32;
            let dy = y as f32 - cy as f32;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < self.min_radius as f32 - 0.5 || dist > self.max_radius as f32 + 0.5 {
                continue;
            }
            let radial = (dx * ux + dy * uy) / dist.max(1.0);
            if radial.abs() < 0.8 {
                continue;
            }
            let bin = (dist.round() as u32).clamp(self.min_radius, self.max_radius);
            histogram[(bin - self.min_radius) as usize] += 1;
        }

        let (best_bin, &support) = histogram
            .iter()
            .enumerate()
            .max_by_key(|&(_, &count)| count)?;
        if support < self.accumulator_threshold {
            return None;
        }
        Some((best_bin as u32 + self.min_radius) as i32)
    }
}
