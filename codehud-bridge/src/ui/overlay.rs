//! HUD overlay: clock, weather, calendar, typing line, pen swatch.

use codehud_core::hud::{HudText, TYPING_LABEL};
use codehud_core::{PenColor, Rgba};

use crate::gfx::{Rect, ShapePipeline, TextRegion};
use crate::shell::layout::HudLayout;

pub const TEXT_COLOR: Rgba = Rgba::WHITE;
pub const TYPING_LABEL_COLOR: Rgba = Rgba::GREEN;

/// Every text line for this frame, positioned.
pub fn regions(lay: &HudLayout, text: &HudText) -> Vec<TextRegion> {
    let mut out = Vec::with_capacity(text.calendar.len() + 4);

    out.push(TextRegion::new(
        text.clock.as_str(),
        lay.clock.x,
        lay.clock.y,
        TEXT_COLOR,
    ));
    out.push(TextRegion::new(
        text.weather.as_str(),
        lay.weather.x,
        lay.weather.y,
        TEXT_COLOR,
    ));

    for (i, line) in text.calendar.iter().enumerate() {
        let at = lay.calendar_line(i);
        out.push(TextRegion::new(line.as_str(), at.x, at.y, TEXT_COLOR));
    }

    if let Some(buffer) = &text.typing {
        out.push(TextRegion::new(
            TYPING_LABEL,
            lay.typing_label.x,
            lay.typing_label.y,
            TYPING_LABEL_COLOR,
        ));
        if !buffer.is_empty() {
            out.push(TextRegion::new(
                buffer.as_str(),
                lay.typing_buffer.x,
                lay.typing_buffer.y,
                TEXT_COLOR,
            ));
        }
    }

    out
}

/// Current pen color in a white-bordered square.
pub fn draw_swatch(shapes: &mut ShapePipeline, lay: &HudLayout, pen: PenColor) {
    let (x, y, size) = (lay.swatch.x, lay.swatch.y, lay.swatch_size);

    shapes.push_rect(Rect {
        x: x - 1.0,
        y: y - 1.0,
        w: size + 2.0,
        h: size + 2.0,
        color: TEXT_COLOR,
    });
    shapes.push_rect(Rect {
        x,
        y,
        w: size,
        h: size,
        color: pen.rgba(),
    });
}
