//! Code HUD bridge library target.
//!
//! The binary entry point is in `main.rs`; this file exposes the shell,
//! GPU and UI modules so `tests/*.rs` can reach the pure parts of them
//! (key mapping, layout math, stroke geometry).

pub mod gfx;
pub mod shell;
pub mod ui;
pub mod util;
