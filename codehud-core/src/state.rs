//! The HUD state machine.
//!
//! One `AppState` lives for the whole process and is touched only by the
//! loop thread. Input events mutate the canvas and the typing pad; feed
//! results arrive as [`FeedUpdate`]s drained from the background queue.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::canvas::{Canvas, Point};
use crate::color::PenColor;
use crate::config::HudConfig;
use crate::feed::{CalendarEvent, FeedStatus, FeedUpdate, MAX_EVENTS, WeatherReport};
use crate::input::{HudEvent, KeyInput, MouseButton};
use crate::refresh::{FeedDispatcher, FeedKind, RefreshSchedule};
use crate::typing::TypingPad;

/// What the loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct AppState {
    // ── Drawing ──
    canvas: Canvas,
    pen: PenColor,
    /// Anchor of the in-progress stroke. `Some` while the left button is held.
    stroke: Option<Point>,
    cursor: Option<Point>,

    // ── Typing ──
    typing: TypingPad,
    toggle_key: char,

    // ── Feeds ──
    location: String,
    weather: FeedStatus<WeatherReport>,
    calendar: FeedStatus<Vec<CalendarEvent>>,
    weather_updated: Option<DateTime<Local>>,
    calendar_updated: Option<DateTime<Local>>,
    weather_schedule: RefreshSchedule,
    calendar_schedule: RefreshSchedule,
}

impl AppState {
    pub fn new(config: &HudConfig) -> Self {
        let interval = Duration::from_secs(config.refresh_interval_secs);
        Self {
            canvas: Canvas::new(),
            pen: PenColor::default(),
            stroke: None,
            cursor: None,
            typing: TypingPad::new(),
            toggle_key: config.toggle_key,
            location: config.weather_location.clone(),
            weather: FeedStatus::Pending,
            calendar: FeedStatus::Pending,
            weather_updated: None,
            calendar_updated: None,
            weather_schedule: RefreshSchedule::new(interval),
            calendar_schedule: RefreshSchedule::new(interval),
        }
    }

    // ────────────────────────────────────────────────────────────────
    // Input
    // ────────────────────────────────────────────────────────────────

    /// Apply one input event.
    pub fn handle_event(&mut self, event: HudEvent) -> Flow {
        match event {
            HudEvent::Quit => return Flow::Quit,

            HudEvent::MouseDown { button, pos } => {
                self.cursor = Some(pos);
                if button == MouseButton::Left && !self.typing.is_active() {
                    self.stroke = Some(pos);
                }
            }

            HudEvent::MouseMove { pos } => {
                self.cursor = Some(pos);
                if self.typing.is_active() {
                    return Flow::Continue;
                }
                if let Some(anchor) = self.stroke {
                    self.canvas.draw_line(anchor, pos, self.pen.rgba());
                    self.stroke = Some(pos);
                }
            }

            HudEvent::MouseUp { button, pos } => {
                self.cursor = Some(pos);
                if button == MouseButton::Left && !self.typing.is_active() {
                    self.stroke = None;
                }
            }

            HudEvent::Key(key) => return self.handle_key(key),
        }
        Flow::Continue
    }

    fn handle_key(&mut self, key: KeyInput) -> Flow {
        if key == KeyInput::Escape {
            return Flow::Quit;
        }

        if self.is_toggle_key(&key) {
            let active = self.typing.toggle();
            if active {
                // No stroke may continue into typing mode.
                self.stroke = None;
            }
            tracing::debug!(active, "typing mode toggled");
            return Flow::Continue;
        }

        if self.typing.is_active() {
            match key {
                KeyInput::Enter => {
                    let committed = self.typing.submit();
                    tracing::debug!(
                        chars = committed.chars().count(),
                        total = self.typing.submitted(),
                        "text submitted"
                    );
                }
                KeyInput::Backspace => self.typing.backspace(),
                KeyInput::Text(ref s) if key.is_printable() => self.typing.push_str(s),
                _ => {}
            }
        } else if let Some(pen) = key.as_char().and_then(PenColor::from_hotkey) {
            self.pen = pen;
            tracing::debug!(pen = pen.label(), "pen color changed");
        }

        Flow::Continue
    }

    fn is_toggle_key(&self, key: &KeyInput) -> bool {
        key.as_char()
            .is_some_and(|c| c.to_lowercase().eq(self.toggle_key.to_lowercase()))
    }

    // ────────────────────────────────────────────────────────────────
    // Feeds
    // ────────────────────────────────────────────────────────────────

    /// Request any feed whose refresh interval has elapsed.
    /// Returns the number of fetches dispatched.
    pub fn tick(&mut self, now: Instant, dispatcher: &mut impl FeedDispatcher) -> usize {
        let mut dispatched = 0;
        if self.weather_schedule.poll(now) {
            dispatcher.dispatch(FeedKind::Weather);
            dispatched += 1;
        }
        if self.calendar_schedule.poll(now) {
            dispatcher.dispatch(FeedKind::Calendar);
            dispatched += 1;
        }
        dispatched
    }

    /// Store a completed fetch. Failures replace the display value with the
    /// error; they never stop the loop.
    pub fn apply_update(&mut self, update: FeedUpdate, at: DateTime<Local>) {
        match update {
            FeedUpdate::Weather(res) => {
                match &res {
                    Ok(report) => {
                        tracing::info!(description = %report.description, temp = report.temperature_f, "weather updated");
                        self.weather_updated = Some(at);
                    }
                    Err(e) => tracing::warn!("weather fetch failed: {}", e),
                }
                self.weather = res.into();
            }
            FeedUpdate::Calendar(res) => {
                match &res {
                    Ok(events) => {
                        tracing::info!(count = events.len(), "calendar updated");
                        self.calendar_updated = Some(at);
                    }
                    Err(e) => tracing::warn!("calendar fetch failed: {}", e),
                }
                self.calendar = res
                    .map(|mut events| {
                        events.truncate(MAX_EVENTS);
                        events
                    })
                    .into();
            }
        }
    }

    /// Earliest moment a feed will next be due.
    pub fn next_refresh_in(&self, now: Instant) -> Duration {
        self.weather_schedule
            .remaining(now)
            .min(self.calendar_schedule.remaining(now))
    }

    // ────────────────────────────────────────────────────────────────
    // Accessors
    // ────────────────────────────────────────────────────────────────

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn pen(&self) -> PenColor {
        self.pen
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    pub fn is_typing(&self) -> bool {
        self.typing.is_active()
    }

    pub fn typed_text(&self) -> &str {
        self.typing.text()
    }

    pub fn typing(&self) -> &TypingPad {
        &self.typing
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn weather(&self) -> &FeedStatus<WeatherReport> {
        &self.weather
    }

    pub fn calendar(&self) -> &FeedStatus<Vec<CalendarEvent>> {
        &self.calendar
    }

    pub fn weather_updated(&self) -> Option<DateTime<Local>> {
        self.weather_updated
    }

    pub fn calendar_updated(&self) -> Option<DateTime<Local>> {
        self.calendar_updated
    }
}
