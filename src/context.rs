// src/context.rs
//
// Per-frame routing. The navigation objective decides which detectors
// run; this module holds no detection logic of its own beyond threshold
// selection and publication. Tracker memory is reset whenever the
// controlling mode moves on, so stale anchors never leak across modes.

use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::cv::find_contours;
use crate::detect::{BallTracker, LineTracker, SignDetector, TargetDetector};
use crate::segmentation::ColorSegmenter;
use crate::telemetry::OutputBoard;
use crate::types::{Frame, NavigationState, Objective, ZoneStatus};

pub struct Perception {
    config: Config,
    segmenter: ColorSegmenter,
    line_tracker: LineTracker,
    sign_detector: SignDetector,
    target_detector: TargetDetector,
    ball_tracker: BallTracker,
    outputs: Arc<OutputBoard>,
    prev_objective: Option<Objective>,
    ball_mode_active: bool,
}

impl Perception {
    pub fn new(config: Config, outputs: Arc<OutputBoard>) -> Self {
        let width = config.camera.width;
        let height = config.camera.height;
        Self {
            segmenter: ColorSegmenter::new(config.colors.clone(), config.line.clone()),
            line_tracker: LineTracker::new(config.line.min_area, width),
            sign_detector: SignDetector::new(config.signs.clone()),
            target_detector: TargetDetector::new(config.target.clone()),
            ball_tracker: BallTracker::new(config.ball.clone(), width, height),
            outputs,
            prev_objective: None,
            ball_mode_active: false,
            config,
        }
    }

    pub fn process_frame(&mut self, frame: &Frame, nav: &NavigationState) {
        self.outputs.begin_frame(frame.seq);

        if self.prev_objective != Some(nav.objective) {
            if self.prev_objective.is_some() {
                debug!(objective = ?nav.objective, "objective changed, resetting trackers");
            }
            self.line_tracker.reset(frame.width);
            self.prev_objective = Some(nav.objective);
        }

        // The ball track is only meaningful while the zone controller is
        // actively hunting the ball; entering that phase starts fresh.
        let ball_mode = nav.objective == Objective::Zone
            && matches!(nav.zone_status, ZoneStatus::FindBall | ZoneStatus::PickupBall);
        if ball_mode && !self.ball_mode_active {
            self.ball_tracker.reset(frame.width, frame.height);
        }
        self.ball_mode_active = ball_mode;

        match nav.objective {
            Objective::FollowLine | Objective::PickUpBox => self.process_line_frame(frame, nav),
            Objective::Zone => self.process_zone_frame(frame, ball_mode),
            Objective::Stop | Objective::Test => {}
        }
    }

    fn process_line_frame(&mut self, frame: &Frame, nav: &NavigationState) {
        let masks = self.segmenter.segment_line(frame, nav);

        self.outputs
            .set_white_mean(masks.white.mean().round() as i32);

        let hazard = find_contours(&masks.red)
            .iter()
            .any(|c| c.area() >= self.config.hazard.min_red_area);
        self.outputs.set_red_detected(hazard);

        let target = self.target_detector.detect(&masks.blue);
        self.outputs.set_box(
            target.is_some(),
            target.map(|t| (t.offset_x, t.offset_y)),
        );

        // The pending turn feeds the POI weighting, so signs go first.
        let turn = self.sign_detector.detect(&masks.green, &masks.line);
        self.outputs.set_turn_dir(turn);

        let line = self.line_tracker.track(&masks.line, turn, nav.rotation);
        self.outputs.set_line(line.detected, line.angle);
    }

    fn process_zone_frame(&mut self, frame: &Frame, ball_mode: bool) {
        let mut masks = self.segmenter.segment_zone(frame);

        if ball_mode {
            let ball = self.ball_tracker.track(
                &masks.gray,
                &mut masks.black,
                &mut masks.white,
                &mut masks.red,
            );
            self.outputs
                .set_ball(ball.map(|b| (b.offset_x, b.offset_y, b.alive)));
        } else {
            self.outputs.set_ball(None);
        }

        // Coverage is read after ball scrubbing so the ball itself cannot
        // register as zone boundary.
        let white = masks.white.mean().round() > self.config.zone.white_mean_threshold;
        let black = find_contours(&masks.black)
            .iter()
            .any(|c| c.area() >= self.config.zone.min_black_area);
        self.outputs.set_zone_coverage(white, black);
    }
}
