// src/types.rs

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::FrameError;

/// One captured camera frame: packed RGB888, immutable after construction.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub seq: u64,
}

impl Frame {
    pub fn from_rgb(
        data: Vec<u8>,
        width: usize,
        height: usize,
        seq: u64,
    ) -> Result<Self, FrameError> {
        let expected = width * height * 3;
        if data.len() != expected {
            return Err(FrameError::BadGeometry {
                expected,
                actual: data.len(),
                width,
                height,
            });
        }
        Ok(Self {
            data,
            width,
            height,
            seq,
        })
    }

    #[inline]
    pub fn rgb_at(&self, x: usize, y: usize) -> (u8, u8, u8) {
        let idx = (y * self.width + x) * 3;
        (self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }
}

/// High-level mission mode, set by the external planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    FollowLine,
    Zone,
    Stop,
    PickUpBox,
    Test,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    LineDetected,
    NoLineDetected,
    GapDetected,
    GapAvoid,
    ObstacleDetected,
    ObstacleAvoid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneStatus {
    Begin,
    CheckCorners,
    TurnCorner,
    FindBall,
    PickupBall,
    FindExit,
}

/// Pitch context from the external IMU pipeline. A ramp changes which part
/// of the frame can be trusted and which black band applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationContext {
    RampUp,
    RampDown,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleDirection {
    None,
    Left,
    Right,
}

/// Marker-inferred turn at the next intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDirection {
    #[default]
    Straight,
    Left,
    Right,
    TurnAround,
}

impl TurnDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnDirection::Straight => "straight",
            TurnDirection::Left => "left",
            TurnDirection::Right => "right",
            TurnDirection::TurnAround => "turn_around",
        }
    }
}

/// Mission state owned by the external planner/controller. The perception
/// core only ever reads it; staleness is the planner's problem.
#[derive(Debug, Clone, Copy)]
pub struct NavigationState {
    pub objective: Objective,
    pub line_status: LineStatus,
    pub zone_status: ZoneStatus,
    pub rotation: RotationContext,
    pub obstacle_direction: ObstacleDirection,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            objective: Objective::FollowLine,
            line_status: LineStatus::LineDetected,
            zone_status: ZoneStatus::Begin,
            rotation: RotationContext::None,
            obstacle_direction: ObstacleDirection::None,
        }
    }
}

/// Shared handle on the navigation state: the planner writes, the
/// perception loop copies the current value once per frame.
#[derive(Clone, Default)]
pub struct SharedNav {
    inner: Arc<RwLock<NavigationState>>,
}

impl SharedNav {
    pub fn new(state: NavigationState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    pub fn set(&self, state: NavigationState) {
        *self.inner.write() = state;
    }

    pub fn current(&self) -> NavigationState {
        *self.inner.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rejects_wrong_buffer_size() {
        assert!(Frame::from_rgb(vec![0u8; 10], 4, 4, 0).is_err());
    }

    #[test]
    fn frame_accepts_exact_buffer() {
        let frame = Frame::from_rgb(vec![0u8; 4 * 4 * 3], 4, 4, 7).unwrap();
        assert_eq!(frame.seq, 7);
        assert_eq!(frame.rgb_at(0, 0), (0, 0, 0));
    }

    #[test]
    fn shared_nav_roundtrip() {
        let nav = SharedNav::default();
        let mut state = nav.current();
        assert_eq!(state.objective, Objective::FollowLine);
        state.objective = Objective::Zone;
        nav.set(state);
        assert_eq!(nav.current().objective, Objective::Zone);
    }
}
