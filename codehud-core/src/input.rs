//! Platform-neutral input events.
//!
//! The bridge translates winit events into these; everything the HUD does
//! with input is decided by [`crate::AppState::handle_event`].

use crate::canvas::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

/// A key press, reduced to what the HUD cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    Enter,
    Backspace,
    Escape,
    /// Text produced by the key (already shifted / composed).
    Text(String),
}

impl KeyInput {
    /// The single character this key produced, if any.
    pub fn as_char(&self) -> Option<char> {
        match self {
            KeyInput::Text(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// True for text containing at least one character and no control codes.
    pub fn is_printable(&self) -> bool {
        match self {
            KeyInput::Text(s) => !s.is_empty() && !s.chars().any(char::is_control),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HudEvent {
    /// Window closed (or Escape pressed).
    Quit,
    MouseDown { button: MouseButton, pos: Point },
    MouseMove { pos: Point },
    MouseUp { button: MouseButton, pos: Point },
    Key(KeyInput),
}
