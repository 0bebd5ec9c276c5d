//! Virtual gamepad device using evdev/uinput
//!
//! One gamepad per player: ten buttons and a digital stick reported on
//! `ABS_X`/`ABS_Y` with a five-step range where only 0, 2 and 4 are used.

use crate::event::EventKind;
use crate::keyboard::emit_one;
use crate::{DeviceError, EventSink};
use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AbsInfo, AbsoluteAxisType, AttributeSet, Key, UinputAbsSetup,
};
use std::time::Duration;
use tracing::debug;

/// Stick range: full negative
pub const AXIS_MIN: i32 = 0;
/// Stick range: centered
pub const AXIS_CENTER: i32 = 2;
/// Stick range: full positive
pub const AXIS_MAX: i32 = 4;

/// Buttons every virtual gamepad advertises
///
/// `BTN_SOUTH`/`BTN_EAST`/`BTN_NORTH`/`BTN_WEST` are the kernel's
/// `BTN_A`/`BTN_B`/`BTN_X`/`BTN_Y`.
pub const GAMEPAD_BUTTONS: [Key; 10] = [
    Key::BTN_SOUTH,
    Key::BTN_EAST,
    Key::BTN_C,
    Key::BTN_NORTH,
    Key::BTN_WEST,
    Key::BTN_Z,
    Key::BTN_TL,
    Key::BTN_TR,
    Key::BTN_START,
    Key::BTN_SELECT,
];

/// Virtual gamepad device
pub struct VirtualGamepad {
    device: Option<VirtualDevice>,
    name: String,
    settle_delay: Duration,
}

impl VirtualGamepad {
    /// Create a new virtual gamepad
    ///
    /// # Arguments
    /// * `name` - Device name (shown in `evtest` and emulator input settings)
    /// * `settle_delay` - Pause used between the two halves of a button tap
    pub fn new(name: &str, settle_delay: Duration) -> Result<Self, DeviceError> {
        let mut keys = AttributeSet::<Key>::new();
        for key in GAMEPAD_BUTTONS {
            keys.insert(key);
        }

        let mut builder = VirtualDeviceBuilder::new()
            .map_err(DeviceError::CreateSink)?
            .name(name)
            .with_keys(&keys)
            .map_err(DeviceError::CreateSink)?;

        for axis in [AbsoluteAxisType::ABS_X, AbsoluteAxisType::ABS_Y] {
            let setup = UinputAbsSetup::new(axis, AbsInfo::new(AXIS_CENTER, AXIS_MIN, AXIS_MAX, 0, 0, 0));
            builder = builder
                .with_absolute_axis(&setup)
                .map_err(DeviceError::CreateSink)?;
        }

        let device = builder.build().map_err(DeviceError::CreateSink)?;
        debug!("Created virtual gamepad \"{}\"", name);

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

impl EventSink for VirtualGamepad {
    fn write(&mut self, code: u16, value: i32, kind: EventKind) -> Result<(), DeviceError> {
        emit_one(&mut self.device, code, value, kind)
    }

    fn settle(&mut self) {
        std::thread::sleep(self.settle_delay);
    }

    fn release(&mut self) -> Result<(), DeviceError> {
        self.device.take().ok_or(DeviceError::Released)?;
        debug!("Destroyed virtual gamepad \"{}\"", self.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_is_midpoint() {
        assert_eq!(AXIS_CENTER, (AXIS_MIN + AXIS_MAX) / 2);
    }

    #[test]
    #[ignore] // Requires uinput access (run with: cargo test -- --ignored)
    fn test_create_gamepad() {
        let mut pad = VirtualGamepad::new("Test Gamepad", Duration::ZERO).unwrap();
        assert!(pad
            .write(AbsoluteAxisType::ABS_X.0, AXIS_MIN, EventKind::Absolute)
            .is_ok());
        assert!(matches!(
            pad.write(0, 0, EventKind::Other),
            Err(DeviceError::Unsupported(_))
        ));
        assert!(pad.release().is_ok());
    }
}
