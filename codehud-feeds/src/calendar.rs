//! Google Calendar v3 client (read-only, primary calendar).

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use codehud_core::CalendarEvent;

use crate::oauth::Authenticator;
use crate::{CalendarSource, FeedError};

pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Shown for events that have no summary.
pub const UNTITLED: &str = "(no title)";

#[derive(Debug, Deserialize)]
struct EventsPage {
    #[serde(default)]
    items: Vec<EventItem>,
}

#[derive(Debug, Deserialize)]
struct EventItem {
    summary: Option<String>,
    start: Option<EventTime>,
}

#[derive(Debug, Deserialize)]
struct EventTime {
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

pub struct GoogleCalendarClient {
    http: Client,
    base_url: String,
    auth: Authenticator,
}

impl GoogleCalendarClient {
    pub fn new(base_url: &str, auth: Authenticator) -> Self {
        Self::with_client(Client::new(), base_url, auth)
    }

    pub fn with_client(http: Client, base_url: &str, auth: Authenticator) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    /// Upcoming single events from `now`, ordered by start time.
    pub fn events_url(&self, now: DateTime<Utc>, max: usize) -> Result<Url, FeedError> {
        let time_min = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        let max = max.to_string();
        let url = Url::parse_with_params(
            &format!("{}/calendar/v3/calendars/primary/events", self.base_url),
            &[
                ("timeMin", time_min.as_str()),
                ("maxResults", max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ],
        )?;
        Ok(url)
    }
}

/// Parse an events list body into at most `max` HUD entries.
/// Items with no start (e.g. cancelled instances) are skipped.
pub fn parse_events(body: &str, max: usize) -> Result<Vec<CalendarEvent>, FeedError> {
    let page: EventsPage = serde_json::from_str(body)?;
    let events = page
        .items
        .into_iter()
        .filter_map(|item| {
            let start = item.start.and_then(|s| s.date_time.or(s.date))?;
            let title = item
                .summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNTITLED.to_string());
            Some(CalendarEvent { start, title })
        })
        .take(max)
        .collect();
    Ok(events)
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect())
}

#[async_trait]
impl CalendarSource for GoogleCalendarClient {
    async fn upcoming(&self, max: usize) -> Result<Vec<CalendarEvent>, FeedError> {
        let token = self.auth.authorized().await?;
        let url = self.events_url(Utc::now(), max)?;

        tracing::debug!(max, "requesting calendar events");

        let resp = self
            .http
            .get(url)
            .bearer_auth(&token.token)
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(FeedError::Status {
                service: "calendar service",
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        parse_events(&text, max)
    }
}
