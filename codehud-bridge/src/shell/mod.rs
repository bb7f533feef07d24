//! Application Shell: winit lifecycle, event dispatch, layout.
//!
//! The shell owns the winit event loop, the tokio runtime that hosts the
//! feed tasks, and the core `AppState`. It translates platform events into
//! `HudEvent`s and coordinates rendering.

pub mod app;
mod events;
pub mod input;
pub mod layout;

pub use app::run;
