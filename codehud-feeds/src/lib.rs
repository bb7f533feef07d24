//! # Code HUD Feeds
//!
//! Network side of the HUD: current weather from OpenWeatherMap, upcoming
//! events from Google Calendar (with the OAuth installed-app flow), and the
//! [`FeedHub`] that runs both as background tasks and queues their results
//! for the render loop.

use async_trait::async_trait;

use codehud_core::{CalendarEvent, WeatherReport};

pub mod calendar;
pub mod error;
pub mod hub;
pub mod oauth;
pub mod redact;
pub mod weather;

pub use calendar::GoogleCalendarClient;
pub use error::FeedError;
pub use hub::FeedHub;
pub use weather::OpenWeatherClient;

/// Any source of current weather.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self) -> Result<WeatherReport, FeedError>;
}

/// Any source of upcoming calendar events, ordered by start time.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn upcoming(&self, max: usize) -> Result<Vec<CalendarEvent>, FeedError>;
}
