//! Refresh scheduling for the external feeds.
//!
//! The render loop ticks at 60 Hz but the feeds are only requested once per
//! interval. A schedule is marked when the request is dispatched, not when
//! the result arrives, so a slow fetch is never duplicated.

use std::time::{Duration, Instant};

/// Default refresh interval (30 minutes).
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(1800);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Weather,
    Calendar,
}

impl FeedKind {
    pub fn label(self) -> &'static str {
        match self {
            FeedKind::Weather => "weather",
            FeedKind::Calendar => "calendar",
        }
    }
}

/// Starts fetches on behalf of the loop. Implementations must not block.
pub trait FeedDispatcher {
    fn dispatch(&mut self, kind: FeedKind);
}

/// Tracks when a feed was last requested.
#[derive(Debug, Clone)]
pub struct RefreshSchedule {
    interval: Duration,
    last_dispatch: Option<Instant>,
}

impl RefreshSchedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_dispatch: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_dispatch(&self) -> Option<Instant> {
        self.last_dispatch
    }

    /// A never-dispatched feed is due immediately; otherwise once more than
    /// `interval` has elapsed.
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_dispatch {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.interval,
        }
    }

    /// If due, mark as dispatched at `now` and return true.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.last_dispatch = Some(now);
            true
        } else {
            false
        }
    }

    /// Time until the next dispatch is due.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_dispatch {
            None => Duration::ZERO,
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
        }
    }
}

impl Default for RefreshSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}
