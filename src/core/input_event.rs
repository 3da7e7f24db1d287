//! DOM-level events delivered to components.

use crate::core::keys::Key;

/// Input event delivered to components by the host.
///
/// `MouseDown` carries the data attributes of the delegated result element:
/// the display value and the serialized filter payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Focus,
    Blur,
    KeyDown { key: Key },
    KeyUp { key: Key },
    MouseDown { value: String, filter: String },
}

impl InputEvent {
    pub fn key_down(code: u32) -> Self {
        InputEvent::KeyDown {
            key: Key::from_code(code),
        }
    }

    pub fn key_up(code: u32) -> Self {
        InputEvent::KeyUp {
            key: Key::from_code(code),
        }
    }

    pub fn key(&self) -> Option<Key> {
        match self {
            InputEvent::KeyDown { key } | InputEvent::KeyUp { key } => Some(*key),
            _ => None,
        }
    }
}
