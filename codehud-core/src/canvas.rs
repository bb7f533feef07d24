//! The persistent drawing layer.
//!
//! Strokes are stored as the segments the cursor traced. The list only ever
//! grows: nothing in the session removes or rewrites a segment. A renderer
//! can track how many segments it has already seen and take only the rest.

use crate::color::Rgba;

/// Stroke width in pixels.
pub const PEN_WIDTH: f32 = 5.0;

/// A position in window pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One straight piece of a freehand stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
    pub color: Rgba,
    pub width: f32,
}

impl Segment {
    pub fn length(&self) -> f32 {
        let dx = self.to.x - self.from.x;
        let dy = self.to.y - self.from.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Append-only drawing surface covering the whole window.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    segments: Vec<Segment>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a line from `from` to `to` with the given pen color.
    pub fn draw_line(&mut self, from: Point, to: Point, color: Rgba) {
        self.segments.push(Segment {
            from,
            to,
            color,
            width: PEN_WIDTH,
        });
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
