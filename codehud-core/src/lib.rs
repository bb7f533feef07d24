//! # Code HUD Core
//!
//! Everything the overlay knows without a window or a network: the
//! persistent drawing canvas, the typing pad, input dispatch, the feed
//! refresh schedule, and the text the HUD shows each frame.
//!
//! The bridge crate owns the platform event loop and the GPU. It translates
//! window events into [`HudEvent`]s, feeds them to [`AppState`], and renders
//! whatever [`hud::compose`] returns.

pub mod canvas;
pub mod color;
pub mod config;
pub mod error;
pub mod feed;
pub mod hud;
pub mod input;
pub mod refresh;
pub mod state;
pub mod typing;

// Re-export the main struct so users can just use `codehud_core::AppState`
pub use state::{AppState, Flow};

// Re-export the simpler types for the bridge
pub use canvas::{Canvas, Point, Segment};
pub use color::{PenColor, Rgba};
pub use config::HudConfig;
pub use feed::{CalendarEvent, FeedStatus, FeedUpdate, WeatherReport};
pub use input::{HudEvent, KeyInput, MouseButton};
pub use refresh::{FeedDispatcher, FeedKind, RefreshSchedule};
