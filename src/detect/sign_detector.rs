// src/detect/sign_detector.rs
//
// Turn inference from green markers. A marker's meaning depends on which
// sides of it touch the line: line above and beside the marker encodes
// the turn at the approaching intersection. Adjacency is sampled from
// four strips of the line mask just outside the marker's rotated box.

use tracing::debug;

use crate::config::SignConfig;
use crate::cv::find_contours;
use crate::segmentation::mask::Mask;
use crate::types::TurnDirection;

/// Which edges of one green marker touch the line mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignAdjacency {
    pub bottom: bool,
    pub top: bool,
    pub left: bool,
    pub right: bool,
}

/// Decision rule over the adjacency records, first qualifying sign wins.
/// Callers pass signs ordered leftmost-first so the outcome does not
/// depend on contour discovery order.
pub fn decide_turn(signs: &[SignAdjacency]) -> TurnDirection {
    for adjacency in signs {
        let left = adjacency.top && adjacency.left;
        let right = adjacency.top && adjacency.right;
        match (left, right) {
            (true, true) => return TurnDirection::TurnAround,
            (true, false) => return TurnDirection::Left,
            (false, true) => return TurnDirection::Right,
            (false, false) => {}
        }
    }
    TurnDirection::Straight
}

pub struct SignDetector {
    config: SignConfig,
}

impl SignDetector {
    pub fn new(config: SignConfig) -> Self {
        Self { config }
    }

    /// Adjacency records for every qualifying green marker, ordered
    /// leftmost-first.
    pub fn adjacencies(&self, green: &Mask, line: &Mask) -> Vec<SignAdjacency> {
        let width = line.width as i32;
        let height = line.height as i32;
        let strip_h = (height as f32 * self.config.strip_ratio) as i32;
        let strip_w = (width as f32 * self.config.strip_ratio) as i32;
        let touch = self.config.touch_threshold;

        let mut signs: Vec<(f32, SignAdjacency)> = Vec::new();

        for contour in find_contours(green) {
            if contour.area() < self.config.min_area {
                continue;
            }
            let mut corners = contour.min_area_rect();

            // Top pair / bottom pair by y.
            corners.sort_by(|a, b| a.y.total_cmp(&b.y));
            let (top_a, top_b) = (corners[0], corners[1]);
            let (bot_a, bot_b) = (corners[2], corners[3]);

            let mut adjacency = SignAdjacency::default();

            let bottom_y = bot_a.y as i32;
            let touching = line
                .mean_rect(
                    bot_a.x.min(bot_b.x) as i32,
                    bottom_y,
                    bot_a.x.max(bot_b.x) as i32,
                    (bottom_y + strip_h).min(height),
                )
                .map(|m| m > touch);
            adjacency.bottom = touching.unwrap_or(false);

            let top_y = top_b.y as i32;
            let touching = line
                .mean_rect(
                    top_a.x.min(top_b.x).max(0.0) as i32,
                    (top_y - strip_h).max(0),
                    top_a.x.max(top_b.x).max(0.0) as i32,
                    top_y,
                )
                .map(|m| m > touch);
            adjacency.top = touching.unwrap_or(false);

            // Left pair / right pair by x.
            corners.sort_by(|a, b| a.x.total_cmp(&b.x));
            let (left_a, left_b) = (corners[0], corners[1]);
            let (right_a, right_b) = (corners[2], corners[3]);

            let left_x = left_b.x as i32;
            let touching = line
                .mean_rect(
                    (left_x - strip_w).max(0),
                    left_a.y.min(left_b.y) as i32,
                    left_x,
                    left_a.y.max(left_b.y) as i32,
                )
                .map(|m| m > touch);
            adjacency.left = touching.unwrap_or(false);

            let right_x = right_a.x as i32;
            let touching = line
                .mean_rect(
                    right_x,
                    right_a.y.min(right_b.y) as i32,
                    (right_x + strip_w).min(width),
                    right_a.y.max(right_b.y) as i32,
                )
                .map(|m| m > touch);
            adjacency.right = touching.unwrap_or(false);

            signs.push((left_a.x, adjacency));
        }

        signs.sort_by(|a, b| a.0.total_cmp(&b.0));
        signs.into_iter().map(|(_, adjacency)| adjacency).collect()
    }

    pub fn detect(&self, green: &Mask, line: &Mask) -> TurnDirection {
        let signs = self.adjacencies(green, line);
        let turn = decide_turn(&signs);
        if turn != TurnDirection::Straight {
            debug!(turn = turn.as_str(), signs = signs.len(), "turn sign");
        }
        turn
    }
}
