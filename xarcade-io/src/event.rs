//! Normalized input events

use evdev::{EventType, InputEvent};
use std::fmt;

/// Key value: released
pub const RELEASE: i32 = 0;
/// Key value: pressed
pub const PRESS: i32 = 1;
/// Key value: kernel autorepeat
pub const REPEAT: i32 = 2;

/// Event category as far as the remapper cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `EV_KEY`
    Key,
    /// `EV_ABS`
    Absolute,
    /// Anything else (`EV_MSC`, `EV_LED`, ...)
    Other,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Key => "EV_KEY",
            EventKind::Absolute => "EV_ABS",
            EventKind::Other => "other",
        }
    }

    /// evdev event type for writing, `None` for [`EventKind::Other`]
    pub fn event_type(&self) -> Option<EventType> {
        match self {
            EventKind::Key => Some(EventType::KEY),
            EventKind::Absolute => Some(EventType::ABSOLUTE),
            EventKind::Other => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event read from the control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: u16,
    pub value: i32,
    pub kind: EventKind,
}

impl KeyEvent {
    pub fn key(code: u16, value: i32) -> Self {
        Self {
            code,
            value,
            kind: EventKind::Key,
        }
    }

    pub fn press(code: u16) -> Self {
        Self::key(code, PRESS)
    }

    pub fn release(code: u16) -> Self {
        Self::key(code, RELEASE)
    }

    /// Press or autorepeat
    pub fn is_press(&self) -> bool {
        self.value != RELEASE
    }

    pub fn is_key(&self) -> bool {
        self.kind == EventKind::Key
    }
}

impl From<&InputEvent> for KeyEvent {
    fn from(ev: &InputEvent) -> Self {
        let kind = match ev.event_type() {
            EventType::KEY => EventKind::Key,
            EventType::ABSOLUTE => EventKind::Absolute,
            _ => EventKind::Other,
        };
        Self {
            code: ev.code(),
            value: ev.value(),
            kind,
        }
    }
}
