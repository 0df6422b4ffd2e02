// src/segmentation/mod.rs

pub mod mask;
pub mod morphology;
pub mod segmenter;

pub use mask::Mask;
pub use segmenter::{ColorSegmenter, LineMasks, ZoneMasks};
