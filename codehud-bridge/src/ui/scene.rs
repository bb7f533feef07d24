//! Scene compositor.

use codehud_core::AppState;
use codehud_core::hud::HudText;

use crate::gfx::{ShapePipeline, TextEngine};
use crate::shell::layout;

pub struct SceneData<'a> {
    pub state: &'a AppState,
    pub text: &'a HudText,
}

/// Canvas first, then the pen swatch and text on top of it.
pub fn compose(
    shapes: &mut ShapePipeline,
    text: &mut TextEngine,
    viewport: [u32; 2],
    data: &SceneData<'_>,
) {
    let lay = layout::compute(viewport);

    super::canvas::draw(shapes, data.state.canvas());
    super::overlay::draw_swatch(shapes, &lay, data.state.pen());
    for region in super::overlay::regions(&lay, data.text) {
        text.push_region(region);
    }
}
