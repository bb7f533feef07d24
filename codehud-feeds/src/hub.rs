//! Background fetches and the result queue.
//!
//! The render loop calls [`FeedHub::dispatch`] when a feed is due. Each
//! dispatch spawns one task on the tokio runtime; the task sends exactly one
//! [`FeedUpdate`] back. The loop drains the queue without blocking.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use codehud_core::feed::MAX_EVENTS;
use codehud_core::{FeedDispatcher, FeedKind, FeedUpdate};

use crate::redact::Redactor;
use crate::{CalendarSource, FeedError, WeatherSource};

const QUEUE_DEPTH: usize = 16;

pub struct FeedHub {
    rt: Handle,
    weather: Arc<dyn WeatherSource>,
    calendar: Arc<dyn CalendarSource>,
    tx: mpsc::Sender<FeedUpdate>,
    rx: mpsc::Receiver<FeedUpdate>,
}

impl FeedHub {
    pub fn new(
        rt: Handle,
        weather: Arc<dyn WeatherSource>,
        calendar: Arc<dyn CalendarSource>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        Self {
            rt,
            weather,
            calendar,
            tx,
            rx,
        }
    }

    /// Every result that has arrived since the last call, in arrival order.
    pub fn drain(&mut self) -> Vec<FeedUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = self.rx.try_recv() {
            updates.push(update);
        }
        updates
    }
}

/// Error text safe to show on screen.
fn display_error(e: FeedError) -> String {
    Redactor::scrub(&e.to_string())
}

impl FeedDispatcher for FeedHub {
    fn dispatch(&mut self, kind: FeedKind) {
        tracing::info!(feed = kind.label(), "refreshing");
        let tx = self.tx.clone();

        match kind {
            FeedKind::Weather => {
                let source = self.weather.clone();
                self.rt.spawn(async move {
                    let result = source.current().await.map_err(display_error);
                    let _ = tx.send(FeedUpdate::Weather(result)).await;
                });
            }
            FeedKind::Calendar => {
                let source = self.calendar.clone();
                self.rt.spawn(async move {
                    let result = source.upcoming(MAX_EVENTS).await.map_err(display_error);
                    let _ = tx.send(FeedUpdate::Calendar(result)).await;
                });
            }
        }
    }
}
