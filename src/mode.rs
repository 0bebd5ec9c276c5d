//! Runtime output mode
//!
//! The mode lives in an atomic cell so the signal listener can flip it while the
//! read loop is blocked or halfway through a batch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Where remapped input goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Raw keys forwarded to the virtual keyboard
    Mame,
    /// Keys translated to the two virtual gamepads
    #[default]
    Gamepad,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Mame => "mame",
            Mode::Gamepad => "gamepad",
        }
    }

    fn to_raw(self) -> u8 {
        match self {
            Mode::Mame => 0,
            Mode::Gamepad => 1,
        }
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Mode::Mame,
            _ => Mode::Gamepad,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared, lock-free mode flag
///
/// Clones share the same cell.
#[derive(Debug, Clone)]
pub struct ModeCell(Arc<AtomicU8>);

impl ModeCell {
    pub fn new(mode: Mode) -> Self {
        Self(Arc::new(AtomicU8::new(mode.to_raw())))
    }

    pub fn load(&self) -> Mode {
        Mode::from_raw(self.0.load(Ordering::Acquire))
    }

    /// Set the mode, returning the previous one
    pub fn store(&self, mode: Mode) -> Mode {
        Mode::from_raw(self.0.swap(mode.to_raw(), Ordering::AcqRel))
    }
}

impl Default for ModeCell {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}
