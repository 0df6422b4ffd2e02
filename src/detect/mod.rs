// src/detect/mod.rs
//
// Per-frame detectors built on the segmentation masks.
//
// Signal flow:
//   line mask  → line_tracker ──────────→ line_detected, line_angle
//   green mask → sign_detector ─────────→ turn_dir (feeds line_tracker)
//   blue mask  → target_detector ───────→ box_detected, target offsets
//   gray frame → ball_tracker (zone) ───→ ball detected/alive, offsets

pub mod ball_tracker;
pub mod line_tracker;
pub mod sign_detector;
pub mod target_detector;

pub use ball_tracker::{BallObservation, BallTracker};
pub use line_tracker::{LineObservation, LineTracker};
pub use sign_detector::{decide_turn, SignAdjacency, SignDetector};
pub use target_detector::{TargetDetector, TargetObservation};
