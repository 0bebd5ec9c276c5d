//! Virtual keyboard device using evdev/uinput
//!
//! Receives passthrough keys in MAME mode and the synthetic Escape of a chord
//! in every mode.

use crate::event::EventKind;
use crate::{DeviceError, EventSink};
use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AttributeSet, InputEvent, Key,
};
use std::time::Duration;
use tracing::debug;

/// Highest key code (exclusive) the virtual keyboard advertises
const KEYBOARD_KEY_LIMIT: u16 = 256;

/// Virtual keyboard device
pub struct VirtualKeyboard {
    device: Option<VirtualDevice>,
    name: String,
    settle_delay: Duration,
}

impl VirtualKeyboard {
    /// Create a new virtual keyboard
    ///
    /// # Arguments
    /// * `name` - Device name (shown in `evtest`)
    /// * `settle_delay` - Pause used between the two halves of a tap
    pub fn new(name: &str, settle_delay: Duration) -> Result<Self, DeviceError> {
        let mut keys = AttributeSet::<Key>::new();
        for code in 0..KEYBOARD_KEY_LIMIT {
            keys.insert(Key::new(code));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(DeviceError::CreateSink)?
            .name(name)
            .with_keys(&keys)
            .map_err(DeviceError::CreateSink)?
            .build()
            .map_err(DeviceError::CreateSink)?;
        debug!("Created virtual keyboard \"{}\"", name);

        Ok(Self {
            device: Some(device),
            name: name.to_string(),
            settle_delay,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl EventSink for VirtualKeyboard {
    fn write(&mut self, code: u16, value: i32, kind: EventKind) -> Result<(), DeviceError> {
        emit_one(&mut self.device, code, value, kind)
    }

    fn settle(&mut self) {
        std::thread::sleep(self.settle_delay);
    }

    fn release(&mut self) -> Result<(), DeviceError> {
        self.device.take().ok_or(DeviceError::Released)?;
        debug!("Destroyed virtual keyboard \"{}\"", self.name);
        Ok(())
    }
}

/// Emit one event on a virtual device (evdev appends the `SYN_REPORT`)
pub(crate) fn emit_one(
    device: &mut Option<VirtualDevice>,
    code: u16,
    value: i32,
    kind: EventKind,
) -> Result<(), DeviceError> {
    let device = device.as_mut().ok_or(DeviceError::Released)?;
    let event_type = kind
        .event_type()
        .ok_or(DeviceError::Unsupported(kind.as_str()))?;
    device
        .emit(&[InputEvent::new(event_type, code, value)])
        .map_err(DeviceError::Write)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires uinput access (run with: cargo test -- --ignored)
    fn test_create_keyboard() {
        let mut keyboard = VirtualKeyboard::new("Test Keyboard", Duration::ZERO).unwrap();
        assert!(keyboard.tap(Key::KEY_ESC.code(), EventKind::Key).is_ok());
        assert!(keyboard.release().is_ok());
        assert!(matches!(keyboard.release(), Err(DeviceError::Released)));
    }
}
