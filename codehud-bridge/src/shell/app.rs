//! Application state and winit event loop.
//!
//! The loop thread owns `AppState` outright. Fetches run on a tokio runtime
//! held by `run()`; `FeedHub` queues their results and `about_to_wait`
//! drains the queue once per pass, so no lock is ever taken on the state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use codehud_core::{AppState, Flow, HudConfig, HudEvent, Point, Rgba, hud};
use codehud_feeds::calendar::CALENDAR_READONLY_SCOPE;
use codehud_feeds::oauth::{Authenticator, TokenStore};
use codehud_feeds::{FeedHub, GoogleCalendarClient, OpenWeatherClient};

use crate::gfx::GpuState;
use crate::ui;

pub const WINDOW_TITLE: &str = "Code HUD";

/// Frame background.
pub const BACKGROUND: Rgba = Rgba::BLACK;

const PLACEHOLDER_API_KEY: &str = "YOUR_OPENWEATHERMAP_API_KEY";

/// The HUD application. Owns all state.
pub struct HudApp {
    // ── Window + GPU ──
    pub window: Option<Arc<Window>>,
    pub gpu: Option<GpuState>,
    window_size: PhysicalSize<u32>,

    // ── HUD ──
    pub state: AppState,
    pub hub: FeedHub,

    /// Last cursor position reported by the window. Button events carry no
    /// position of their own.
    pub cursor: Point,

    // ── Frame pacing ──
    frame_interval: Duration,
    next_frame: Instant,
}

/// Next frame deadline after `prev`. A loop that fell behind skips the
/// missed frames instead of replaying them.
pub fn next_deadline(prev: Instant, now: Instant, interval: Duration) -> Instant {
    let next = prev + interval;
    if next > now { next } else { now + interval }
}

/// When the loop should next wake: the frame deadline, or sooner if a feed
/// falls due first.
pub fn wake_deadline(next_frame: Instant, now: Instant, refresh_in: Duration) -> Instant {
    next_frame.min(now + refresh_in)
}

impl HudApp {
    pub fn new(config: &HudConfig, hub: FeedHub) -> Self {
        Self {
            window: None,
            gpu: None,
            window_size: PhysicalSize::new(config.window_width, config.window_height),
            state: AppState::new(config),
            hub,
            cursor: Point::new(0.0, 0.0),
            frame_interval: config.tick_interval(),
            next_frame: Instant::now(),
        }
    }

    /// Request a window redraw.
    pub fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    /// Feed one input event to the state. Exits the loop on quit.
    pub fn dispatch(&mut self, event: HudEvent, event_loop: &ActiveEventLoop) {
        match self.state.handle_event(event) {
            Flow::Quit => {
                tracing::info!("Quit requested");
                event_loop.exit();
            }
            Flow::Continue => self.request_redraw(),
        }
    }

    /// Apply every fetch result that has arrived. Returns true if any did.
    pub fn poll_feeds(&mut self) -> bool {
        let updates = self.hub.drain();
        let changed = !updates.is_empty();
        for update in updates {
            self.state.apply_update(update, Local::now());
        }
        changed
    }

    /// Draw one frame.
    pub fn render(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let text = hud::compose(&self.state, &Local::now());
        let state = &self.state;

        let result = gpu.render_frame(BACKGROUND, |shapes, glyphs, viewport| {
            ui::scene::compose(
                shapes,
                glyphs,
                viewport,
                &ui::scene::SceneData { state, text: &text },
            );
        });

        if let Err(e) = result {
            tracing::error!("Render failed: {:#}", e);
        }
    }
}

// ════════════════════════════════════════════════════════════════════
// ApplicationHandler (winit 0.30)
// ════════════════════════════════════════════════════════════════════

impl ApplicationHandler for HudApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(self.window_size)
            .with_resizable(false);

        match event_loop.create_window(attrs) {
            Ok(window) => {
                let window = Arc::new(window);
                match GpuState::new(window.clone()) {
                    Ok(gpu) => {
                        self.gpu = Some(gpu);
                        self.window = Some(window);
                        tracing::info!("Window + GPU initialized");
                    }
                    Err(e) => {
                        tracing::error!("GPU init failed: {:#}", e);
                        event_loop.exit();
                    }
                }
            }
            Err(e) => {
                tracing::error!("Window creation failed: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        super::events::handle_window_event(self, event_loop, event);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.poll_feeds();
        let now = Instant::now();
        self.state.tick(now, &mut self.hub);

        if now >= self.next_frame {
            self.request_redraw();
            self.next_frame = next_deadline(self.next_frame, now, self.frame_interval);
        }

        let wake = wake_deadline(self.next_frame, now, self.state.next_refresh_in(now));
        event_loop.set_control_flow(ControlFlow::WaitUntil(wake));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Surface before window
        self.gpu = None;
        self.window = None;
        tracing::info!("Renderer shut down");
    }
}

// ════════════════════════════════════════════════════════════════════
// Entry Point
// ════════════════════════════════════════════════════════════════════

/// Build the weather and calendar clients and the queue they report to.
fn build_hub(config: &HudConfig, rt: tokio::runtime::Handle) -> FeedHub {
    if config.weather_api_key == PLACEHOLDER_API_KEY {
        tracing::warn!("No OpenWeatherMap API key configured; weather requests will fail");
    }

    let weather = OpenWeatherClient::new(
        &config.weather_base_url,
        &config.weather_api_key,
        &config.weather_location,
    );

    let auth = Authenticator::new(
        config.credentials_file.clone(),
        TokenStore::new(config.token_file.clone()),
        vec![CALENDAR_READONLY_SCOPE.to_string()],
    );
    let calendar = GoogleCalendarClient::new(&config.calendar_base_url, auth);

    FeedHub::new(rt, Arc::new(weather), Arc::new(calendar))
}

/// Run the HUD until the window closes.
pub fn run(config: HudConfig) -> anyhow::Result<()> {
    // Tracing is initialized once in the binary entry point (src/main.rs).

    tracing::info!("Code HUD v{} starting...", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        location = %config.weather_location,
        refresh_secs = config.refresh_interval_secs,
        tick_hz = config.tick_rate_hz,
        "configuration loaded"
    );

    let rt = tokio::runtime::Runtime::new()?;
    let hub = build_hub(&config, rt.handle().clone());

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = HudApp::new(&config, hub);
    event_loop.run_app(&mut app)?;
    drop(app);

    // An unfinished fetch (or a consent flow still waiting on the browser)
    // is abandoned here.
    rt.shutdown_timeout(Duration::from_secs(1));
    tracing::info!("Code HUD stopped");

    Ok(())
}
