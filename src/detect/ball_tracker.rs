// src/detect/ball_tracker.rs
//
// Zone-mode ball tracking. Circle candidates compete on continuity with
// the last accepted position; a candidate resting against the dark zone
// boundary is "dead" and heavily deprioritized, but never discarded
// outright, so track is not lost when only a dead ball is visible.

use tracing::debug;

use crate::config::BallConfig;
use crate::cv::{Circle, CircleDetector, GrayImage};
use crate::segmentation::mask::Mask;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BallObservation {
    pub offset_x: i32,
    pub offset_y: i32,
    pub alive: bool,
}

pub struct BallTracker {
    config: BallConfig,
    detector: CircleDetector,
    last: (i32, i32),
}

impl BallTracker {
    pub fn new(config: BallConfig, frame_width: usize, frame_height: usize) -> Self {
        let detector = CircleDetector {
            min_radius: config.min_radius,
            max_radius: config.max_radius,
            min_center_dist: config.min_center_dist,
            gradient_threshold: config.gradient_threshold,
            accumulator_threshold: config.accumulator_threshold,
        };
        Self {
            config,
            detector,
            last: (frame_width as i32 / 2, frame_height as i32 / 2),
        }
    }

    /// Drop the temporal track, e.g. when the zone mode moves on.
    pub fn reset(&mut self, frame_width: usize, frame_height: usize) {
        self.last = (frame_width as i32 / 2, frame_height as i32 / 2);
    }

    pub fn last_position(&self) -> (i32, i32) {
        self.last
    }

    /// Continuity distance with the boundary penalty applied. Lower wins.
    fn score(&self, circle: &Circle, black: &Mask) -> (i64, bool) {
        let distance =
            ((circle.x - self.last.0).abs() + (circle.y - self.last.1).abs()) as i64;
        let roi = black.mean_rect(
            circle.x - circle.r,
            circle.y - circle.r,
            circle.x + circle.r,
            circle.y + circle.r,
        );
        // No reading (fully clipped circle) counts as a live surface.
        let dead = roi.map(|m| m > self.config.dead_mean_threshold).unwrap_or(false);
        if dead {
            (distance + black.width as i64, false)
        } else {
            (distance, true)
        }
    }

    fn select(&self, circles: &[Circle], black: &Mask) -> Option<(Circle, bool)> {
        circles
            .iter()
            .map(|&c| {
                let (score, alive) = self.score(&c, black);
                (score, c, alive)
            })
            .min_by_key(|&(score, _, _)| score)
            .map(|(_, c, alive)| (c, alive))
    }

    /// Detect and track the ball for this frame. Every circle region, kept
    /// or rejected, is scrubbed from the boundary masks afterwards so the
    /// ball cannot be misread as zone boundary or hazard.
    pub fn track(
        &mut self,
        gray: &GrayImage,
        black: &mut Mask,
        white: &mut Mask,
        red: &mut Mask,
    ) -> Option<BallObservation> {
        let circles = self.detector.detect(gray);
        if circles.is_empty() {
            return None;
        }

        let (chosen, alive) = self.select(&circles, black)?;
        self.last = (chosen.x, chosen.y);

        let scale = self.config.suppress_radius_scale;
        for circle in &circles {
            let r = (circle.r as f32 * scale) as i32;
            black.zero_circle(circle.x, circle.y, r);
            white.zero_circle(circle.x, circle.y, r);
            red.zero_circle(circle.x, circle.y, r);
        }

        debug!(
            x = chosen.x,
            y = chosen.y,
            r = chosen.r,
            alive,
            candidates = circles.len(),
            "ball track"
        );

        Some(BallObservation {
            offset_x: chosen.x - black.width as i32 / 2,
            offset_y: chosen.y - black.height as i32 / 2,
            alive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::cv::filter::gaussian_blur5;

    const W: usize = 448;
    const H: usize = 336;

    fn tracker() -> BallTracker {
        BallTracker::new(Config::default().ball, W, H)
    }

    fn blacken(mask: &mut Mask, x0: usize, x1: usize, y0: usize, y1: usize) {
        for y in y0..y1 {
            for x in x0..x1 {
                mask.set(x, y, true);
            }
        }
    }

    #[test]
    fn continuity_penalty_prefers_live_ball() {
        let mut tracker = tracker();
        tracker.last = (224, 168);

        let mut boundary = Mask::new(W, H);
        blacken(&mut boundary, 0, W, 0, H);
        let open = Mask::new(W, H);

        let far = Circle { x: 234, y: 168, r: 20 }; // manhattan distance 10
        let near = Circle { x: 227, y: 170, r: 20 }; // manhattan distance 5

        let (far_score, far_alive) = tracker.score(&far, &open);
        let (near_score, near_alive) = tracker.score(&near, &boundary);
        assert_eq!((far_score, far_alive), (10, true));
        assert_eq!((near_score, near_alive), (5 + W as i64, false));
        // The dead-but-nearer candidate loses on the adjusted distance.
        assert!(far_score < near_score);
    }

    #[test]
    fn select_takes_minimum_adjusted_distance() {
        let mut tracker = tracker();
        tracker.last = (224, 168);

        let mut black = Mask::new(W, H);
        // Dead zone under the nearer candidate only.
        blacken(&mut black, 80, 160, 80, 160);

        let near_dead = Circle { x: 120, y: 120, r: 30 };
        let far_live = Circle { x: 300, y: 220, r: 30 };
        let (chosen, alive) = tracker.select(&[near_dead, far_live], &black).unwrap();
        assert_eq!(chosen, far_live);
        assert!(alive);
    }

    #[test]
    fn clipped_sampling_region_reads_as_live() {
        let tracker = tracker();
        let black = Mask::new(W, H);
        let clipped = Circle { x: -50, y: -50, r: 20 };
        let (_, alive) = tracker.score(&clipped, &black);
        assert!(alive);
    }

    #[test]
    fn track_finds_disc_and_scrubs_masks() {
        let mut gray = GrayImage::new(W, H);
        gray.data.fill(20);
        for y in 0..H as i32 {
            for x in 0..W as i32 {
                let dx = (x - 224) as i64;
                let dy = (y - 168) as i64;
                if dx * dx + dy * dy <= 110 * 110 {
                    gray.data[y as usize * W + x as usize] = 230;
                }
            }
        }
        let gray = gaussian_blur5(&gray);

        let mut black = Mask::new(W, H);
        blacken(&mut black, 0, W, 0, H);
        let mut white = Mask::new(W, H);
        let mut red = Mask::new(W, H);

        let mut tracker = tracker();
        let obs = tracker.track(&gray, &mut black, &mut white, &mut red).unwrap();
        assert!(obs.offset_x.abs() <= 5);
        assert!(obs.offset_y.abs() <= 5);
        // The whole frame was black, so the ball reads dead.
        assert!(!obs.alive);
        // The circle region is scrubbed from the boundary mask.
        assert!(!black.get(224, 168));
        assert!(!black.get(224 + 100, 168));
        // Last accepted position persists for the next frame.
        assert!((tracker.last_position().0 - 224).abs() <= 5);
    }

    #[test]
    fn reset_recenters_last_position() {
        let mut tracker = tracker();
        tracker.last = (10, 10);
        tracker.reset(W, H);
        assert_eq!(tracker.last_position(), (224, 168));
    }
}
