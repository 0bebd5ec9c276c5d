//! Device layer for the X-Arcade remapper
//!
//! This crate provides the two façades the remapping core talks to:
//!
//! - [`RawInputSource`] - the physical control panel, read in batches
//! - [`EventSink`] - a virtual keyboard or gamepad that accepts writes
//!
//! Backends:
//!
//! - evdev/uinput (`EvdevSource`, `VirtualKeyboard`, `VirtualGamepad`)
//! - in-memory (`ScriptedSource`, `MemorySink`) for tests and dry runs

pub mod error;
pub mod event;
pub mod memory;

mod gamepad;
mod keyboard;
mod source;

pub use error::DeviceError;
pub use event::{EventKind, KeyEvent, PRESS, RELEASE, REPEAT};
pub use gamepad::{VirtualGamepad, AXIS_CENTER, AXIS_MAX, AXIS_MIN, GAMEPAD_BUTTONS};
pub use keyboard::VirtualKeyboard;
pub use memory::{Emitted, MemorySink, ScriptedSource, SinkLog};
pub use source::{EvdevSource, XARCADE_DEVICE_PATH, XARCADE_DEVICE_NAME};

use async_trait::async_trait;
use std::time::Duration;

/// Default pause between a synthetic press and its release
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// A physical input device delivering key events
///
/// The remapper owns exactly one source for the whole process lifetime.
#[async_trait]
pub trait RawInputSource: Send {
    /// Wait for the next batch of events
    ///
    /// A batch is everything the device reported up to its next sync marker.
    /// Waits indefinitely. Any error means the device is gone; callers are
    /// expected to shut down rather than retry.
    async fn read_batch(&mut self) -> Result<Vec<KeyEvent>, DeviceError>;

    /// Give up exclusive access to the device
    ///
    /// Calling this more than once is harmless but returns
    /// [`DeviceError::Released`].
    fn release(&mut self) -> Result<(), DeviceError>;
}

/// A virtual output device
pub trait EventSink: Send {
    /// Write a single event (sync marker appended by the backend)
    fn write(&mut self, code: u16, value: i32, kind: EventKind) -> Result<(), DeviceError>;

    /// Pause between a synthetic press and its release so consumers see two edges
    fn settle(&mut self);

    /// Destroy the virtual device
    fn release(&mut self) -> Result<(), DeviceError>;

    /// Press, settle, release
    fn tap(&mut self, code: u16, kind: EventKind) -> Result<(), DeviceError> {
        self.write(code, PRESS, kind)?;
        self.settle();
        self.write(code, RELEASE, kind)
    }
}

/// Type alias for a boxed sink
pub type BoxedSink = Box<dyn EventSink>;

/// Type alias for a boxed source
pub type BoxedSource = Box<dyn RawInputSource>;
