// src/detect/target_detector.rs

use crate::config::TargetConfig;
use crate::cv::find_contours;
use crate::segmentation::mask::Mask;

/// Pickup-target report: offsets are the box center relative to frame
/// center, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetObservation {
    pub offset_x: i32,
    pub offset_y: i32,
}

pub struct TargetDetector {
    config: TargetConfig,
}

impl TargetDetector {
    pub fn new(config: TargetConfig) -> Self {
        Self { config }
    }

    /// Largest qualifying blue contour, or `None`. Only a single target is
    /// ever reported; secondary boxes in view are ignored.
    pub fn detect(&self, blue: &Mask) -> Option<TargetObservation> {
        let best = find_contours(blue)
            .into_iter()
            .filter(|c| c.area() >= self.config.min_box_area)
            .max_by(|a, b| a.area().total_cmp(&b.area()))?;

        let (cx, cy) = best.bounding_box().center();
        Some(TargetObservation {
            offset_x: cx - blue.width as i32 / 2,
            offset_y: cy - blue.height as i32 / 2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    const W: usize = 448;
    const H: usize = 336;

    fn fill(mask: &mut Mask, x0: usize, x1: usize, y0: usize, y1: usize) {
        for y in y0..y1 {
            for x in x0..x1 {
                mask.set(x, y, true);
            }
        }
    }

    fn detector() -> TargetDetector {
        TargetDetector::new(Config::default().target)
    }

    #[test]
    fn empty_mask_reports_nothing() {
        assert!(detector().detect(&Mask::new(W, H)).is_none());
    }

    #[test]
    fn small_blob_is_ignored() {
        let mut blue = Mask::new(W, H);
        fill(&mut blue, 100, 130, 100, 130); // area 841, floor is 2000
        assert!(detector().detect(&blue).is_none());
    }

    #[test]
    fn offsets_are_relative_to_frame_center() {
        let mut blue = Mask::new(W, H);
        fill(&mut blue, 300, 380, 40, 120); // center (340, 80)
        let obs = detector().detect(&blue).unwrap();
        assert!((obs.offset_x - (340 - 224)).abs() <= 1);
        assert!((obs.offset_y - (80 - 168)).abs() <= 1);
    }

    #[test]
    fn largest_qualifying_box_wins() {
        let mut blue = Mask::new(W, H);
        fill(&mut blue, 20, 80, 20, 80); // area ~3481
        fill(&mut blue, 200, 320, 150, 270); // area ~14161
        let obs = detector().detect(&blue).unwrap();
        assert!(obs.offset_x > 0, "expected the larger right-side box");
    }
}
