//! HUD text composition.
//!
//! Turns the current [`AppState`] into the strings drawn this frame. The
//! bridge only decides where and in what color they go.

use chrono::{DateTime, TimeZone};

use crate::feed::{CalendarEvent, FeedStatus, MAX_EVENTS, WeatherReport};
use crate::state::AppState;

pub const WEATHER_PENDING: &str = "Fetching weather...";
pub const CALENDAR_PENDING: &str = "Fetching calendar...";
pub const CALENDAR_EMPTY: &str = "No upcoming events";
pub const TYPING_LABEL: &str = "Typing Mode:";

/// Every string the HUD draws for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudText {
    pub clock: String,
    pub weather: String,
    pub calendar: Vec<String>,
    /// `Some(buffer)` while typing mode is active.
    pub typing: Option<String>,
}

pub fn compose<Tz: TimeZone>(state: &AppState, now: &DateTime<Tz>) -> HudText
where
    Tz::Offset: std::fmt::Display,
{
    HudText {
        clock: clock_line(now),
        weather: weather_line(state.location(), state.weather()),
        calendar: calendar_lines(state.calendar()),
        typing: state.is_typing().then(|| state.typed_text().to_string()),
    }
}

pub fn clock_line<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%H:%M:%S").to_string()
}

pub fn weather_line(location: &str, status: &FeedStatus<WeatherReport>) -> String {
    match status {
        FeedStatus::Pending => WEATHER_PENDING.to_string(),
        FeedStatus::Ready(report) => {
            let place = if report.location.is_empty() {
                location
            } else {
                &report.location
            };
            format!(
                "{}: {}, {:.1}°F",
                place, report.description, report.temperature_f
            )
        }
        FeedStatus::Failed(msg) => format!("Error fetching weather: {}", msg),
    }
}

pub fn calendar_lines(status: &FeedStatus<Vec<CalendarEvent>>) -> Vec<String> {
    match status {
        FeedStatus::Pending => vec![CALENDAR_PENDING.to_string()],
        FeedStatus::Ready(events) if events.is_empty() => vec![CALENDAR_EMPTY.to_string()],
        FeedStatus::Ready(events) => events
            .iter()
            .take(MAX_EVENTS)
            .map(|e| format!("{} - {}", e.start, e.title))
            .collect(),
        FeedStatus::Failed(msg) => vec![format!("Error fetching calendar: {}", msg)],
    }
}
