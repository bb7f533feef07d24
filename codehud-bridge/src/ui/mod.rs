//! Composable UI components.
//!
//! Each component knows how to draw itself into the shape + text pipelines.
//! The scene module orchestrates composition.

pub mod canvas;
pub mod overlay;
pub mod scene;
