//! GPU Rendering Subsystem.
//!
//! Manages the wgpu device, surface, and rendering pipelines.
//! Sub-modules:
//!   renderer: wgpu device/surface lifecycle, frame orchestration
//!   shapes  : flat-colored triangles (canvas strokes, pen swatch)
//!   text    : glyphon-based text rendering

mod renderer;
pub mod shapes;
pub mod text;

pub use renderer::GpuState;
pub use shapes::{Rect, ShapePipeline};
pub use text::{TextEngine, TextRegion};
