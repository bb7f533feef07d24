//! External data snapshots (weather, calendar) and their display status.

use serde::{Deserialize, Serialize};

/// Maximum number of calendar events fetched and shown.
pub const MAX_EVENTS: usize = 5;

/// A current-conditions observation for the configured location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    pub description: String,
    pub temperature_f: f64,
}

/// An upcoming calendar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// RFC3339 `dateTime`, or the bare `date` for all-day events.
    pub start: String,
    pub title: String,
}

/// What the HUD currently holds for one feed.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FeedStatus<T> {
    /// Nothing has arrived yet.
    #[default]
    Pending,
    Ready(T),
    Failed(String),
}

impl<T> FeedStatus<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, FeedStatus::Pending)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            FeedStatus::Ready(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> From<Result<T, String>> for FeedStatus<T> {
    fn from(res: Result<T, String>) -> Self {
        match res {
            Ok(v) => FeedStatus::Ready(v),
            Err(e) => FeedStatus::Failed(e),
        }
    }
}

/// Result delivered from a background fetch back to the loop thread.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
    Weather(Result<WeatherReport, String>),
    Calendar(Result<Vec<CalendarEvent>, String>),
}
