// src/detect/line_tracker.rs
//
// Selects the authoritative line contour among candidates and derives a
// steering angle from a weighted point-of-interest heuristic. The only
// frame-to-frame state is the previous anchor x, used to break ties
// between several bottom-touching contours so the tracker does not
// oscillate between parallel segments at a branch or gap.

use tracing::debug;

use crate::cv::{find_contours, Contour};
use crate::segmentation::mask::Mask;
use crate::types::{RotationContext, TurnDirection};

#[derive(Debug, Clone, Copy)]
pub struct LineObservation {
    pub detected: bool,
    /// Steering angle in [-180, 180]; `None` on a miss (previous published
    /// value stays in force downstream).
    pub angle: Option<i32>,
}

impl LineObservation {
    fn miss() -> Self {
        Self {
            detected: false,
            angle: None,
        }
    }
}

struct Candidate {
    index: usize,
    anchor_y: f32,
    anchor_mid_x: f32,
    touches_bottom: bool,
}

/// Map a POI's horizontal position to degrees. Linear around frame
/// center, so scaling the frame and the offset together is a no-op.
pub fn offset_to_angle(poi_x: f64, frame_width: f64) -> i32 {
    let half = frame_width / 2.0;
    ((poi_x - half) / half * 180.0) as i32
}

pub struct LineTracker {
    min_area: f64,
    last_x: f32,
}

impl LineTracker {
    pub fn new(min_area: f64, frame_width: usize) -> Self {
        Self {
            min_area,
            last_x: frame_width as f32 / 2.0,
        }
    }

    /// Forget the temporal anchor, e.g. when the objective changes.
    pub fn reset(&mut self, frame_width: usize) {
        self.last_x = frame_width as f32 / 2.0;
    }

    pub fn last_anchor_x(&self) -> f32 {
        self.last_x
    }

    pub fn track(
        &mut self,
        line: &Mask,
        turn_dir: TurnDirection,
        rotation: RotationContext,
    ) -> LineObservation {
        let width = line.width as f32;
        let height = line.height as f32;

        let contours: Vec<Contour> = find_contours(line)
            .into_iter()
            .filter(|c| c.area() >= self.min_area)
            .collect();
        if contours.is_empty() {
            return LineObservation::miss();
        }

        // Bottom anchor: the two lowest min-area-rect corners.
        let mut candidates: Vec<Candidate> = Vec::with_capacity(contours.len());
        for (index, contour) in contours.iter().enumerate() {
            let mut corners = contour.min_area_rect();
            corners.sort_by(|a, b| b.y.total_cmp(&a.y));
            let anchor_y = corners[0].y;
            let anchor_mid_x = (corners[0].x + corners[1].x) / 2.0;
            candidates.push(Candidate {
                index,
                anchor_y,
                anchor_mid_x,
                touches_bottom: anchor_y >= height * 0.95,
            });
        }

        let off_bottom = candidates.iter().filter(|c| c.touches_bottom).count();
        let chosen = if off_bottom > 1 {
            // Several contours reach the robot: stick with the one closest
            // to where the line was last frame.
            candidates
                .iter()
                .filter(|c| c.touches_bottom)
                .min_by(|a, b| {
                    let da = (self.last_x - a.anchor_mid_x).abs();
                    let db = (self.last_x - b.anchor_mid_x).abs();
                    da.total_cmp(&db)
                })
                .expect("off_bottom > 1 guarantees a bottom-touching candidate")
        } else {
            candidates
                .iter()
                .max_by(|a, b| a.anchor_y.total_cmp(&b.anchor_y))
                .expect("contours is non-empty")
        };

        self.last_x = chosen.anchor_mid_x;
        let contour = &contours[chosen.index];

        // Three POIs: top, left, right extremes with the tied coordinate
        // averaged out.
        let points = &contour.points;
        let y_min = points.iter().map(|p| p.y).min().unwrap_or(0);
        let x_min = points.iter().map(|p| p.x).min().unwrap_or(0);
        let x_max = points.iter().map(|p| p.x).max().unwrap_or(0);

        let mean_of = |values: Vec<i32>| -> f32 {
            if values.is_empty() {
                return 0.0;
            }
            values.iter().map(|&v| v as f64).sum::<f64>() as f32 / values.len() as f32
        };

        let top = (
            mean_of(points.iter().filter(|p| p.y == y_min).map(|p| p.x).collect()),
            y_min as f32,
        );
        let left = (
            x_min as f32,
            mean_of(points.iter().filter(|p| p.x == x_min).map(|p| p.y).collect()),
        );
        let right = (
            x_max as f32,
            mean_of(points.iter().filter(|p| p.x == x_max).map(|p| p.y).collect()),
        );

        let pois = [top, left, right];
        let black_top = top.1 < height * 0.1;
        let center = (width / 2.0, height);

        let mut best_score = f64::MIN;
        let mut best_poi = top;
        for (i, &(px, py)) in pois.iter().enumerate() {
            let dx = (center.0 - px) as f64;
            let dy = (center.1 - py) as f64;
            let mut score = (dx * dx + dy * dy).sqrt();

            // Prefer looking ahead over a crossing line, except on ramps
            // where the top of the frame is unreliable.
            if i == 0 && rotation == RotationContext::None {
                score *= 1.5;
            }

            // Edge artifacts: a side POI hugging its frame edge (without a
            // genuine top intersection) or any POI at the very top.
            if (i == 1 && px < width * 0.1 && !black_top)
                || (i == 2 && px > width * 0.9 && !black_top)
                || py < height * 0.05
            {
                score += (height * 2.0) as f64;
            }

            // A pending turn pushes the tracker off the closing side.
            if (i == 1 && turn_dir == TurnDirection::Left)
                || (i == 2 && turn_dir == TurnDirection::Right)
            {
                score += (width * 5.0) as f64;
            }

            if score > best_score {
                best_score = score;
                best_poi = (px, py);
            }
        }

        let angle = offset_to_angle(best_poi.0 as f64, width as f64);
        debug!(
            angle,
            poi_x = best_poi.0,
            poi_y = best_poi.1,
            anchor_x = self.last_x,
            "line selected"
        );

        LineObservation {
            detected: true,
            angle: Some(angle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: usize = 448;
    const H: usize = 336;

    fn bar(mask: &mut Mask, x0: usize, x1: usize, y0: usize, y1: usize) {
        for y in y0..y1 {
            for x in x0..x1 {
                mask.set(x, y, true);
            }
        }
    }

    #[test]
    fn empty_mask_is_a_miss() {
        let mut tracker = LineTracker::new(5000.0, W);
        let obs = tracker.track(
            &Mask::new(W, H),
            TurnDirection::Straight,
            RotationContext::None,
        );
        assert!(!obs.detected);
        assert!(obs.angle.is_none());
    }

    #[test]
    fn speckle_below_area_floor_is_a_miss() {
        let mut mask = Mask::new(W, H);
        bar(&mut mask, 200, 210, 300, 336);
        let mut tracker = LineTracker::new(5000.0, W);
        let obs = tracker.track(&mask, TurnDirection::Straight, RotationContext::None);
        assert!(!obs.detected);
    }

    #[test]
    fn area_floor_is_inclusive_at_the_boundary() {
        // Boundary trace area of a w x h block is (w-1) * (h-1).
        let mut at_floor = Mask::new(W, H);
        bar(&mut at_floor, 100, 141, 200, 221); // 40 * 20 = 800
        let mut tracker = LineTracker::new(800.0, W);
        assert!(
            tracker
                .track(&at_floor, TurnDirection::Straight, RotationContext::None)
                .detected
        );

        let mut below_floor = Mask::new(W, H);
        bar(&mut below_floor, 100, 148, 200, 218); // 47 * 17 = 799
        let mut tracker = LineTracker::new(800.0, W);
        assert!(
            !tracker
                .track(&below_floor, TurnDirection::Straight, RotationContext::None)
                .detected
        );
    }

    #[test]
    fn centered_bar_steers_straight() {
        let mut mask = Mask::new(W, H);
        bar(&mut mask, 209, 239, 0, H);
        let mut tracker = LineTracker::new(5000.0, W);
        let obs = tracker.track(&mask, TurnDirection::Straight, RotationContext::None);
        assert!(obs.detected);
        let angle = obs.angle.unwrap();
        assert!(angle.abs() <= 5, "angle was {}", angle);
    }

    #[test]
    fn angle_stays_in_range_for_extreme_offsets() {
        for x0 in [0usize, W - 40] {
            let mut mask = Mask::new(W, H);
            bar(&mut mask, x0, x0 + 40, 100, H);
            let mut tracker = LineTracker::new(5000.0, W);
            let obs = tracker.track(&mask, TurnDirection::Straight, RotationContext::None);
            let angle = obs.angle.unwrap();
            assert!((-180..=180).contains(&angle), "angle was {}", angle);
        }
    }

    #[test]
    fn angle_mapping_is_scale_invariant() {
        let base = offset_to_angle(280.0, 448.0);
        let doubled = offset_to_angle(560.0, 896.0);
        assert_eq!(base, doubled);
        assert_eq!(offset_to_angle(0.0, 448.0), -180);
        assert_eq!(offset_to_angle(448.0, 448.0), 180);
    }

    #[test]
    fn bottom_tie_breaks_toward_previous_anchor() {
        let mut mask = Mask::new(W, H);
        bar(&mut mask, 35, 66, 0, H); // anchor mid ~50
        bar(&mut mask, 185, 216, 0, H); // anchor mid ~200
        let mut tracker = LineTracker::new(5000.0, W);
        tracker.last_x = 60.0;
        let obs = tracker.track(&mask, TurnDirection::Straight, RotationContext::None);
        assert!(obs.detected);
        assert!(
            (tracker.last_anchor_x() - 50.0).abs() < 3.0,
            "anchor was {}",
            tracker.last_anchor_x()
        );
    }

    #[test]
    fn single_bottom_toucher_wins_over_floating_contour() {
        let mut mask = Mask::new(W, H);
        bar(&mut mask, 300, 331, 150, H); // reaches the bottom
        bar(&mut mask, 50, 120, 20, 120); // floating blob, larger area
        let mut tracker = LineTracker::new(5000.0, W);
        let obs = tracker.track(&mask, TurnDirection::Straight, RotationContext::None);
        assert!(obs.detected);
        assert!(
            (tracker.last_anchor_x() - 315.0).abs() < 3.0,
            "anchor was {}",
            tracker.last_anchor_x()
        );
    }

    #[test]
    fn reset_recenters_the_anchor() {
        let mut tracker = LineTracker::new(5000.0, W);
        tracker.last_x = 10.0;
        tracker.reset(W);
        assert_eq!(tracker.last_anchor_x(), W as f32 / 2.0);
    }
}
