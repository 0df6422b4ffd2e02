// src/main.rs

mod config;
mod context;
mod cv;
mod detect;
mod error;
mod segmentation;
mod telemetry;
mod types;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tracing::{debug, error, info, warn};

use config::Config;
use context::Perception;
use telemetry::{OutputBoard, TelemetrySnapshot};
use types::{Frame, SharedNav};

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path))?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("linesight={}", config.logging.level))
        .init();

    info!("Line perception core starting");
    info!(
        "Frame geometry: {}x{} | line area floor: {} | black band: {}",
        config.camera.width, config.camera.height, config.line.min_area, config.colors.black_none_max
    );

    let frame_files = find_frame_files(&config.source.input_dir)?;
    if frame_files.is_empty() {
        error!("No .rgb frames found in {}", config.source.input_dir);
        return Ok(());
    }
    info!("Found {} frame(s) to process", frame_files.len());

    fs::create_dir_all(&config.source.output_dir)?;
    let jsonl_path = Path::new(&config.source.output_dir).join("detections.jsonl");
    let mut results_file = fs::File::create(&jsonl_path)?;
    info!("Results will be written to {}", jsonl_path.display());

    // The planner process owns the navigation state; standalone we run the
    // whole sequence under the default follow-line mission. The terminate
    // flag belongs to whoever embeds the loop; nothing trips it here.
    let nav = SharedNav::default();
    let terminate = Arc::new(AtomicBool::new(false));
    let outputs = OutputBoard::shared();
    let mut perception = Perception::new(config.clone(), outputs.clone());

    let stats = run_frames(
        &frame_files,
        &config,
        &nav,
        &terminate,
        &mut perception,
        &outputs,
        &mut results_file,
    )?;

    info!("Final report:");
    info!("  Frames processed: {}", stats.total_frames);
    info!("  Frames skipped (bad geometry): {}", stats.bad_frames);
    info!(
        "  Line present: {} ({:.1}%)",
        stats.frames_with_line,
        100.0 * stats.frames_with_line as f64 / stats.total_frames.max(1) as f64
    );
    info!("  Turn signs seen: {}", stats.turn_signs_seen);
    info!("  Hazard frames: {}", stats.hazard_frames);
    info!("  Target frames: {}", stats.target_frames);
    info!("  Processing speed: {:.1} FPS", stats.avg_fps);

    Ok(())
}

#[derive(Default)]
struct PerceptionStats {
    total_frames: u64,
    bad_frames: u64,
    frames_with_line: u64,
    turn_signs_seen: u64,
    hazard_frames: u64,
    target_frames: u64,
    avg_fps: f64,
}

/// Raw frames are packed RGB888 dumps named so that lexicographic order is
/// capture order.
fn find_frame_files(input_dir: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(input_dir)
        .with_context(|| format!("reading frame directory {}", input_dir))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "rgb"))
        .collect();
    files.sort();
    Ok(files)
}

fn run_frames(
    frame_files: &[PathBuf],
    config: &Config,
    nav: &SharedNav,
    terminate: &AtomicBool,
    perception: &mut Perception,
    outputs: &OutputBoard,
    results_file: &mut fs::File,
) -> Result<PerceptionStats> {
    let start_time = std::time::Instant::now();
    let mut stats = PerceptionStats::default();
    let mut seq: u64 = 0;

    for path in frame_files {
        // Checked between frames only; a frame in flight always finishes.
        if terminate.load(Ordering::Relaxed) {
            info!("Terminate requested, stopping after {} frame(s)", stats.total_frames);
            break;
        }

        let data = fs::read(path)?;
        seq += 1;
        let frame = match Frame::from_rgb(data, config.camera.width, config.camera.height, seq) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                stats.bad_frames += 1;
                continue;
            }
        };

        perception.process_frame(&frame, &nav.current());
        let snapshot = outputs.snapshot();
        record_stats(&mut stats, &snapshot);
        save_snapshot(&snapshot, results_file)?;

        if stats.total_frames % 50 == 0 {
            info!(
                "Progress: {}/{} | line: {} | angle: {} | turn: {}",
                stats.total_frames,
                frame_files.len(),
                snapshot.line_detected,
                snapshot.line_angle,
                snapshot.turn_dir.as_str()
            );
        }
    }

    let duration = start_time.elapsed();
    stats.avg_fps = stats.total_frames as f64 / duration.as_secs_f64().max(1e-9);
    debug!(
        "Processed {} frame(s) in {:.2}s",
        stats.total_frames,
        duration.as_secs_f64()
    );
    Ok(stats)
}

fn record_stats(stats: &mut PerceptionStats, snapshot: &TelemetrySnapshot) {
    stats.total_frames += 1;
    if snapshot.line_detected {
        stats.frames_with_line += 1;
    }
    if snapshot.turn_dir != types::TurnDirection::Straight {
        stats.turn_signs_seen += 1;
    }
    if snapshot.red_detected {
        stats.hazard_frames += 1;
    }
    if snapshot.box_detected {
        stats.target_frames += 1;
    }
}

fn save_snapshot(snapshot: &TelemetrySnapshot, file: &mut fs::File) -> Result<()> {
    let json_line = serde_json::to_string(snapshot)?;
    writeln!(file, "{}", json_line)?;
    Ok(())
}
