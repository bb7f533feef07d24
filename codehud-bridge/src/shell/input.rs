//! Translation of winit input into core events.
//!
//! Kept free of window state so the mapping can be tested directly.

use winit::event::MouseButton as WinitButton;
use winit::keyboard::{Key, NamedKey};

use codehud_core::{KeyInput, MouseButton};

/// Map a pressed key to a [`KeyInput`].
///
/// `text` is the text the key produced (`KeyEvent::text`), which already
/// accounts for shift and layout. When it is absent, a character key falls
/// back to its logical value. Keys that produce nothing are dropped.
pub fn map_key(key: &Key, text: Option<&str>) -> Option<KeyInput> {
    match key {
        Key::Named(NamedKey::Enter) => Some(KeyInput::Enter),
        Key::Named(NamedKey::Backspace) => Some(KeyInput::Backspace),
        Key::Named(NamedKey::Escape) => Some(KeyInput::Escape),
        _ => {
            let produced = text.or(match key {
                Key::Character(c) => Some(c.as_str()),
                _ => None,
            })?;
            (!produced.is_empty()).then(|| KeyInput::Text(produced.to_string()))
        }
    }
}

/// Whether a press should reach the core. Auto-repeat only passes for
/// Backspace; a held toggle or hotkey acts once.
pub fn accept_press(key: &KeyInput, repeat: bool) -> bool {
    !repeat || *key == KeyInput::Backspace
}

pub fn map_button(button: WinitButton) -> MouseButton {
    match button {
        WinitButton::Left => MouseButton::Left,
        WinitButton::Right => MouseButton::Right,
        WinitButton::Middle => MouseButton::Middle,
        _ => MouseButton::Other,
    }
}
