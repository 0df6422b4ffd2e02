// src/error.rs

use thiserror::Error;

/// Faults in frame construction. Detection never errors: a frame with no
/// usable candidates yields "not detected" outputs, not an `Err`.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame buffer is {actual} bytes, expected {expected} for {width}x{height} RGB")]
    BadGeometry {
        expected: usize,
        actual: usize,
        width: usize,
        height: usize,
    },
}
