//! Event types shared by all collector backends.
//!
//! Key and button identifiers are opaque: they exist so that repeat detection
//! can compare actions, and are never inspected for validity or meaning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier for a keyboard key.
///
/// Wraps the raw platform key code (virtual-key code on Windows, CGKeyCode on
/// macOS). The value is only ever compared for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyId(pub u32);

/// Mouse button classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Identity of a single user action, used for repeat detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionId {
    Key(KeyId),
    Button(MouseButton),
}

/// A single key press.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyboardEvent {
    /// Timestamp when the press occurred
    pub timestamp: DateTime<Utc>,
    /// Which key was pressed (opaque)
    pub key: KeyId,
}

impl KeyboardEvent {
    pub fn new(key: KeyId) -> Self {
        Self {
            timestamp: Utc::now(),
            key,
        }
    }
}

/// A single mouse click.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MouseEvent {
    /// Timestamp when the click occurred
    pub timestamp: DateTime<Utc>,
    /// Which button was clicked
    pub button: MouseButton,
}

impl MouseEvent {
    pub fn click(button: MouseButton) -> Self {
        Self {
            timestamp: Utc::now(),
            button,
        }
    }
}

/// Unified event type for the collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InputEvent {
    Keyboard(KeyboardEvent),
    Mouse(MouseEvent),
}

impl InputEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            InputEvent::Keyboard(e) => e.timestamp,
            InputEvent::Mouse(e) => e.timestamp,
        }
    }

    /// Identity of the action this event represents.
    pub fn action_id(&self) -> ActionId {
        match self {
            InputEvent::Keyboard(e) => ActionId::Key(e.key),
            InputEvent::Mouse(e) => ActionId::Button(e.button),
        }
    }
}
