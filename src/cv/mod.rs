// src/cv/mod.rs
//
// Raster primitives the detectors are built on: contour tracing, polygon
// geometry, circle detection, small filters. Everything works on plain
// byte rasters; no color knowledge lives here.

pub mod circles;
pub mod contours;
pub mod filter;
pub mod geometry;

pub use circles::{Circle, CircleDetector};
pub use contours::{find_contours, Contour};
pub use geometry::{convex_hull, min_area_rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointF {
    pub x: f32,
    pub y: f32,
}

impl PointF {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Grayscale raster, one byte per pixel.
#[derive(Debug, Clone)]
pub struct GrayImage {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl GrayImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0; width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }
}
