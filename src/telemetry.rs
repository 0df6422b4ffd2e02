// src/telemetry.rs
//
// Published perception outputs. Single writer (the frame loop), many
// readers (motion controller, planner). Fields are written independently
// as each detector finishes; readers may see a mix of two adjacent frames
// for a brief window. That is accepted for latency — the frame sequence
// number lets a reader detect the partial-update window if it cares.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::types::TurnDirection;

#[derive(Debug, Clone, Serialize)]
pub struct TelemetrySnapshot {
    pub frame_seq: u64,
    pub line_angle: i32,
    pub line_detected: bool,
    pub turn_dir: TurnDirection,
    pub red_detected: bool,
    pub box_detected: bool,
    pub target_offset_x: i32,
    pub target_offset_y: i32,
    pub white_mean: i32,
    pub zone_white: bool,
    pub zone_black: bool,
    pub zone_ball_detected: bool,
    pub zone_ball_alive: bool,
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self {
            frame_seq: 0,
            line_angle: 0,
            line_detected: false,
            turn_dir: TurnDirection::Straight,
            red_detected: false,
            box_detected: false,
            target_offset_x: 0,
            target_offset_y: 0,
            white_mean: 0,
            zone_white: false,
            zone_black: false,
            zone_ball_detected: false,
            zone_ball_alive: false,
        }
    }
}

#[derive(Default)]
pub struct OutputBoard {
    inner: RwLock<TelemetrySnapshot>,
}

impl OutputBoard {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Stamp the sequence number of the frame now being processed. Called
    /// before any field writes for that frame.
    pub fn begin_frame(&self, seq: u64) {
        self.inner.write().frame_seq = seq;
    }

    /// Line detected: publishes flag and angle. On a miss the angle is left
    /// untouched — the core never invents a fallback steering value.
    pub fn set_line(&self, detected: bool, angle: Option<i32>) {
        let mut out = self.inner.write();
        out.line_detected = detected;
        if let Some(angle) = angle {
            out.line_angle = angle;
        }
    }

    pub fn set_turn_dir(&self, dir: TurnDirection) {
        self.inner.write().turn_dir = dir;
    }

    pub fn set_red_detected(&self, detected: bool) {
        self.inner.write().red_detected = detected;
    }

    pub fn set_box(&self, detected: bool, offset: Option<(i32, i32)>) {
        let mut out = self.inner.write();
        out.box_detected = detected;
        if let Some((x, y)) = offset {
            out.target_offset_x = x;
            out.target_offset_y = y;
        }
    }

    pub fn set_white_mean(&self, mean: i32) {
        self.inner.write().white_mean = mean;
    }

    pub fn set_zone_coverage(&self, white: bool, black: bool) {
        let mut out = self.inner.write();
        out.zone_white = white;
        out.zone_black = black;
    }

    /// Ball report. `None` marks a miss: only the detected flag drops,
    /// liveness and offsets hold their last values.
    pub fn set_ball(&self, report: Option<(i32, i32, bool)>) {
        let mut out = self.inner.write();
        match report {
            Some((x, y, alive)) => {
                out.zone_ball_detected = true;
                out.zone_ball_alive = alive;
                out.target_offset_x = x;
                out.target_offset_y = y;
            }
            None => out.zone_ball_detected = false,
        }
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.inner.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_holds_previous_angle() {
        let board = OutputBoard::default();
        board.set_line(true, Some(42));
        board.set_line(false, None);
        let snap = board.snapshot();
        assert!(!snap.line_detected);
        assert_eq!(snap.line_angle, 42);
    }

    #[test]
    fn sequence_number_tracks_frames() {
        let board = OutputBoard::default();
        board.begin_frame(3);
        board.set_turn_dir(TurnDirection::Left);
        let snap = board.snapshot();
        assert_eq!(snap.frame_seq, 3);
        assert_eq!(snap.turn_dir, TurnDirection::Left);
    }

    #[test]
    fn ball_and_box_share_target_offsets() {
        let board = OutputBoard::default();
        board.set_box(true, Some((10, -4)));
        board.set_ball(Some((-7, 2, true)));
        let snap = board.snapshot();
        assert_eq!((snap.target_offset_x, snap.target_offset_y), (-7, 2));
        assert!(snap.box_detected);
        assert!(snap.zone_ball_detected);
    }

    #[test]
    fn ball_miss_keeps_last_liveness_and_offsets() {
        let board = OutputBoard::default();
        board.set_ball(Some((5, 6, true)));
        board.set_ball(None);
        let snap = board.snapshot();
        assert!(!snap.zone_ball_detected);
        assert!(snap.zone_ball_alive);
        assert_eq!((snap.target_offset_x, snap.target_offset_y), (5, 6));
    }
}
