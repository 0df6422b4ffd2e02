// src/config.rs

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub camera: CameraConfig,
    pub source: SourceConfig,
    pub colors: ColorConfig,
    pub line: LineConfig,
    pub signs: SignConfig,
    pub hazard: HazardConfig,
    pub target: TargetConfig,
    pub ball: BallConfig,
    pub zone: ZoneConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 448,
            height: 336,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub input_dir: String,
    pub output_dir: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            input_dir: "frames".to_string(),
            output_dir: "output".to_string(),
        }
    }
}

/// One HSV band: hue in degrees 0-360, saturation 0-100, value 0-255.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HsvBand {
    pub hue_min: f32,
    pub hue_max: f32,
    pub sat_min: f32,
    pub val_min: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Per-channel RGB upper bound for the line band, by rotation context.
    pub black_none_max: u8,
    pub black_ramp_up_max: u8,
    pub black_obstacle_max: u8,
    /// Narrow fallback band used when glare inflates the line mask.
    pub black_narrow_max: u8,
    pub zone_black_max: u8,
    pub white_min: u8,
    pub green: HsvBand,
    pub red_low: HsvBand,
    pub red_high: HsvBand,
    pub blue: HsvBand,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            black_none_max: 80,
            black_ramp_up_max: 80,
            black_obstacle_max: 65,
            black_narrow_max: 20,
            zone_black_max: 50,
            white_min: 240,
            green: HsvBand {
                hue_min: 80.0,
                hue_max: 200.0,
                sat_min: 19.6,
                val_min: 20.0,
            },
            red_low: HsvBand {
                hue_min: 0.0,
                hue_max: 20.0,
                sat_min: 39.2,
                val_min: 90.0,
            },
            red_high: HsvBand {
                hue_min: 340.0,
                hue_max: 360.0,
                sat_min: 39.2,
                val_min: 100.0,
            },
            blue: HsvBand {
                hue_min: 170.0,
                hue_max: 320.0,
                sat_min: 31.4,
                val_min: 60.0,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    pub min_area: f64,
    pub erode_iterations: usize,
    pub dilate_iterations: usize,
    /// Mean of the top quarter of the line mask above which glare handling kicks in.
    pub glare_mean_threshold: f64,
    /// The narrow mask replaces the wide one only if its mean is lower by this much.
    pub glare_margin: f64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            min_area: 5000.0,
            erode_iterations: 5,
            dilate_iterations: 12,
            glare_mean_threshold: 90.0,
            glare_margin: 60.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignConfig {
    pub min_area: f64,
    /// Strip depth as a fraction of the frame dimension it extends along.
    pub strip_ratio: f32,
    pub touch_threshold: f64,
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            min_area: 3000.0,
            strip_ratio: 0.2,
            touch_threshold: 125.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    pub min_red_area: f64,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            min_red_area: 15000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub min_box_area: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            min_box_area: 2000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub min_radius: u32,
    pub max_radius: u32,
    pub min_center_dist: u32,
    pub gradient_threshold: u32,
    pub accumulator_threshold: u32,
    /// Mean of the zone-black mask inside the circle above which the ball
    /// is resting against a boundary ("dead").
    pub dead_mean_threshold: f64,
    pub suppress_radius_scale: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            min_radius: 100,
            max_radius: 170,
            min_center_dist: 55,
            gradient_threshold: 50,
            accumulator_threshold: 30,
            dead_mean_threshold: 150.0,
            suppress_radius_scale: 1.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub white_mean_threshold: f64,
    pub min_black_area: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            white_mean_threshold: 8.0,
            min_black_area: 10000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
