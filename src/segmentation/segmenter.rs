// src/segmentation/segmenter.rs
//
// Per-class color segmentation. HSV bands for the painted classes
// (green markers, red hazard, blue target), raw RGB bands for the
// line (near-black) and boundary (near-white) classes.

use tracing::debug;

use super::mask::Mask;
use super::morphology;
use crate::config::{ColorConfig, HsvBand, LineConfig};
use crate::cv::filter::{gaussian_blur5, rgb_to_gray};
use crate::cv::GrayImage;
use crate::types::{Frame, LineStatus, NavigationState, ObstacleDirection, RotationContext};

/// Convert RGB to HSV. Returns (H: 0-360, S: 0-100, V: 0-255).
#[inline]
pub fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let r_n = r / 255.0;
    let g_n = g / 255.0;
    let b_n = b / 255.0;

    let max = r_n.max(g_n).max(b_n);
    let min = r_n.min(g_n).min(b_n);
    let delta = max - min;

    let h = if delta < 1e-6 {
        0.0
    } else if (max - r_n).abs() < 1e-6 {
        60.0 * (((g_n - b_n) / delta) % 6.0)
    } else if (max - g_n).abs() < 1e-6 {
        60.0 * (((b_n - r_n) / delta) + 2.0)
    } else {
        60.0 * (((r_n - g_n) / delta) + 4.0)
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    let s = if max < 1e-6 { 0.0 } else { (delta / max) * 100.0 };
    let v = max * 255.0;

    (h, s, v)
}

#[inline]
fn in_band(h: f32, s: f32, v: f32, band: &HsvBand) -> bool {
    h >= band.hue_min && h <= band.hue_max && s >= band.sat_min && v >= band.val_min
}

/// Masks for the line-following path.
pub struct LineMasks {
    pub line: Mask,
    pub green: Mask,
    pub red: Mask,
    pub blue: Mask,
    pub white: Mask,
}

/// Masks for the zone path, plus the blurred grayscale the circle
/// detector runs on.
pub struct ZoneMasks {
    pub black: Mask,
    pub white: Mask,
    pub red: Mask,
    pub gray: GrayImage,
}

pub struct ColorSegmenter {
    colors: ColorConfig,
    line: LineConfig,
}

impl ColorSegmenter {
    pub fn new(colors: ColorConfig, line: LineConfig) -> Self {
        Self { colors, line }
    }

    /// Black-band upper bound for the current driving context.
    fn black_max_for(&self, nav: &NavigationState) -> u8 {
        if nav.line_status == LineStatus::ObstacleAvoid {
            self.colors.black_obstacle_max
        } else if nav.rotation == RotationContext::RampUp {
            self.colors.black_ramp_up_max
        } else {
            self.colors.black_none_max
        }
    }

    /// Raw black band minus the colored classes: dark green or dark blue
    /// paint must not read as line.
    fn black_mask(&self, frame: &Frame, max: u8, green: &Mask, blue: &Mask) -> Mask {
        let mut mask = Mask::new(frame.width, frame.height);
        for y in 0..frame.height {
            for x in 0..frame.width {
                let (r, g, b) = frame.rgb_at(x, y);
                if r <= max && g <= max && b <= max {
                    mask.set(x, y, true);
                }
            }
        }
        mask.subtract(green);
        mask.subtract(blue);
        mask
    }

    pub fn segment_line(&self, frame: &Frame, nav: &NavigationState) -> LineMasks {
        let width = frame.width;
        let height = frame.height;
        let white_min = self.colors.white_min;

        let mut green = Mask::new(width, height);
        let mut red = Mask::new(width, height);
        let mut blue = Mask::new(width, height);
        let mut white = Mask::new(width, height);

        for y in 0..height {
            for x in 0..width {
                let (r, g, b) = frame.rgb_at(x, y);
                let (h, s, v) = rgb_to_hsv(r as f32, g as f32, b as f32);
                if in_band(h, s, v, &self.colors.green) {
                    green.set(x, y, true);
                }
                if in_band(h, s, v, &self.colors.red_low) || in_band(h, s, v, &self.colors.red_high)
                {
                    red.set(x, y, true);
                }
                if in_band(h, s, v, &self.colors.blue) {
                    blue.set(x, y, true);
                }
                if r >= white_min && g >= white_min && b >= white_min {
                    white.set(x, y, true);
                }
            }
        }

        let mut line = self.black_mask(frame, self.black_max_for(nav), &green, &blue);

        // Glare inflates the wide black band in the upper frame. When the
        // narrow band measurably reduces coverage there, trust it instead.
        if nav.rotation == RotationContext::None {
            let top_quarter = (height as f64 * 0.25) as i32;
            if let Some(wide_mean) = line.mean_rect(0, 0, width as i32, top_quarter) {
                if wide_mean > self.line.glare_mean_threshold {
                    let narrow =
                        self.black_mask(frame, self.colors.black_narrow_max, &green, &blue);
                    let narrow_mean = narrow
                        .mean_rect(0, 0, width as i32, top_quarter)
                        .unwrap_or(0.0);
                    if narrow_mean + self.line.glare_margin < wide_mean {
                        debug!(wide_mean, narrow_mean, "glare fallback: narrow black band");
                        line = narrow;
                    }
                }
            }
        }

        morphology::erode(&mut line, self.line.erode_iterations);
        morphology::dilate(&mut line, self.line.dilate_iterations);

        // Contextual suppression: blank out the frame regions the current
        // driving context says cannot hold the authoritative line.
        if nav.rotation == RotationContext::RampUp {
            line.zero_rect(0, 0, width as i32, (height as f64 * 0.6) as i32);
        }
        if matches!(
            nav.line_status,
            LineStatus::ObstacleAvoid | LineStatus::ObstacleDetected
        ) {
            match nav.obstacle_direction {
                ObstacleDirection::Left => {
                    line.zero_rect(0, 0, (width as f64 * 0.7) as i32, height as i32)
                }
                ObstacleDirection::Right => {
                    line.zero_rect((width as f64 * 0.3) as i32, 0, width as i32, height as i32)
                }
                ObstacleDirection::None => {}
            }
        }

        LineMasks {
            line,
            green,
            red,
            blue,
            white,
        }
    }

    pub fn segment_zone(&self, frame: &Frame) -> ZoneMasks {
        let width = frame.width;
        let height = frame.height;
        let black_max = self.colors.zone_black_max;
        let white_min = self.colors.white_min;

        let mut black = Mask::new(width, height);
        let mut red = Mask::new(width, height);
        let mut white = Mask::new(width, height);

        for y in 0..height {
            for x in 0..width {
                let (r, g, b) = frame.rgb_at(x, y);
                if r <= black_max && g <= black_max && b <= black_max {
                    black.set(x, y, true);
                }
                if r >= white_min && g >= white_min && b >= white_min {
                    white.set(x, y, true);
                }
                let (h, s, v) = rgb_to_hsv(r as f32, g as f32, b as f32);
                if in_band(h, s, v, &self.colors.red_low) || in_band(h, s, v, &self.colors.red_high)
                {
                    red.set(x, y, true);
                }
            }
        }

        let gray = gaussian_blur5(&rgb_to_gray(frame));

        ZoneMasks {
            black,
            white,
            red,
            gray,
        }
    }
}
