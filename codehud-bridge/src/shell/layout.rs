//! Layout computations.
//!
//! Pixel anchors for each HUD element. Positions are fixed offsets from the
//! top-left, except the typing line (pinned to the bottom) and the pen
//! swatch (pinned to the top-right corner).

/// Top-left corner of a text line, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

impl Anchor {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Layout regions in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudLayout {
    /// Total viewport width.
    pub width: f32,
    /// Total viewport height.
    pub height: f32,

    pub clock: Anchor,
    pub weather: Anchor,
    /// First calendar line; later lines step down by `CALENDAR_LINE_STEP`.
    pub calendar: Anchor,
    pub typing_label: Anchor,
    pub typing_buffer: Anchor,

    /// Pen swatch square (top-left corner and side length).
    pub swatch: Anchor,
    pub swatch_size: f32,
}

/// Left margin shared by every text line.
pub const MARGIN: f32 = 10.0;

/// Vertical distance between calendar lines.
pub const CALENDAR_LINE_STEP: f32 = 30.0;

/// Distance of the typing line from the bottom edge.
pub const TYPING_BOTTOM_OFFSET: f32 = 50.0;

/// The typed text starts here, right of the label.
pub const TYPING_BUFFER_X: f32 = 150.0;

pub const SWATCH_SIZE: f32 = 20.0;

/// Compute the layout for the given viewport.
pub fn compute(viewport: [u32; 2]) -> HudLayout {
    let w = viewport[0] as f32;
    let h = viewport[1] as f32;
    let typing_y = h - TYPING_BOTTOM_OFFSET;

    HudLayout {
        width: w,
        height: h,

        clock: Anchor::new(MARGIN, 10.0),
        weather: Anchor::new(MARGIN, 50.0),
        calendar: Anchor::new(MARGIN, 100.0),
        typing_label: Anchor::new(MARGIN, typing_y),
        typing_buffer: Anchor::new(TYPING_BUFFER_X, typing_y),

        swatch: Anchor::new(w - SWATCH_SIZE - MARGIN, MARGIN),
        swatch_size: SWATCH_SIZE,
    }
}

impl HudLayout {
    /// Anchor of the `index`-th calendar line.
    pub fn calendar_line(&self, index: usize) -> Anchor {
        Anchor::new(
            self.calendar.x,
            self.calendar.y + index as f32 * CALENDAR_LINE_STEP,
        )
    }
}
