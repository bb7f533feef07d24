//! Drawing canvas component.

use codehud_core::Canvas;

use crate::gfx::ShapePipeline;

/// Hand new strokes to the retained shape layer.
pub fn draw(shapes: &mut ShapePipeline, canvas: &Canvas) {
    shapes.sync_canvas(canvas);
}
