//! Winit event handling.
//!
//! Translates WindowEvent into `HudEvent`s:
//!   CloseRequested → quit
//!   CursorMoved    → mouse move (position remembered for button events)
//!   MouseInput     → mouse down / up
//!   KeyboardInput  → key (presses only, auto-repeat filtered)

use winit::event::{ElementState, WindowEvent};
use winit::event_loop::ActiveEventLoop;

use codehud_core::{HudEvent, Point};

use super::app::HudApp;
use super::input::{accept_press, map_button, map_key};

pub fn handle_window_event(app: &mut HudApp, event_loop: &ActiveEventLoop, event: WindowEvent) {
    match event {
        // ── Window lifecycle ──────────────────────────────────────
        WindowEvent::CloseRequested => {
            tracing::info!("Window close requested");
            app.dispatch(HudEvent::Quit, event_loop);
        }

        WindowEvent::Destroyed => {
            tracing::info!("Window destroyed");
        }

        WindowEvent::Resized(new_size) => {
            if let Some(gpu) = &mut app.gpu {
                gpu.resize(new_size);
            }
            app.request_redraw();
        }

        // ── Mouse ────────────────────────────────────────────────
        WindowEvent::CursorMoved { position, .. } => {
            let pos = Point::new(position.x as f32, position.y as f32);
            app.cursor = pos;
            app.dispatch(HudEvent::MouseMove { pos }, event_loop);
        }

        WindowEvent::MouseInput { state, button, .. } => {
            let button = map_button(button);
            let pos = app.cursor;
            let event = match state {
                ElementState::Pressed => HudEvent::MouseDown { button, pos },
                ElementState::Released => HudEvent::MouseUp { button, pos },
            };
            app.dispatch(event, event_loop);
        }

        // ── Keyboard ─────────────────────────────────────────────
        WindowEvent::KeyboardInput { event, .. } => {
            if event.state != ElementState::Pressed {
                return;
            }
            let Some(key) = map_key(&event.logical_key, event.text.as_deref()) else {
                return;
            };
            if accept_press(&key, event.repeat) {
                app.dispatch(HudEvent::Key(key), event_loop);
            }
        }

        // ── Redraw ───────────────────────────────────────────────
        WindowEvent::RedrawRequested => app.render(),

        _ => {}
    }
}
