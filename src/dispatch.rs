//! Routes resolved actions to the virtual devices

use crate::mapping::{Action, Player};
use crate::mode::{Mode, ModeCell};
use tracing::{trace, warn};
use xarcade_io::{BoxedSink, DeviceError, EventKind, EventSink, KeyEvent};

/// The three virtual output devices
pub struct OutputSinks {
    pub keyboard: BoxedSink,
    /// Indexed by [`Player::index`]
    pub gamepads: [BoxedSink; 2],
}

impl OutputSinks {
    pub fn new(keyboard: BoxedSink, player_one: BoxedSink, player_two: BoxedSink) -> Self {
        Self {
            keyboard,
            gamepads: [player_one, player_two],
        }
    }

    pub fn gamepad(&mut self, player: Player) -> &mut dyn EventSink {
        self.gamepads[player.index()].as_mut()
    }

    /// Release every sink, returning the failures
    pub fn release_all(&mut self) -> Vec<(&'static str, DeviceError)> {
        let mut failures = Vec::new();
        if let Err(e) = self.keyboard.release() {
            failures.push(("keyboard", e));
        }
        for (name, pad) in ["gamepad 1", "gamepad 2"].into_iter().zip(self.gamepads.iter_mut()) {
            if let Err(e) = pad.release() {
                failures.push((name, e));
            }
        }
        failures
    }
}

/// Chooses between keyboard passthrough and gamepad output
#[derive(Debug, Clone)]
pub struct Dispatcher {
    mode: ModeCell,
}

impl Dispatcher {
    pub fn new(mode: ModeCell) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> &ModeCell {
        &self.mode
    }

    /// Emit one resolved action
    ///
    /// The mode is read once; a toggle arriving mid-call applies to the next
    /// event.
    pub fn dispatch(&self, outputs: &mut OutputSinks, player: Player, action: Action, raw: &KeyEvent) {
        match self.mode.load() {
            Mode::Mame => {
                trace!("{} {:?} -> keyboard {}={}", player, action, raw.code, raw.value);
                report(
                    outputs.keyboard.write(raw.code, raw.value, EventKind::Key),
                    "keyboard",
                );
            }
            Mode::Gamepad => {
                trace!("{} {:?} -> gamepad", player, action);
                let pad = outputs.gamepad(player);
                let result = match action {
                    Action::Button { button, pressed } => {
                        pad.write(button.code(), i32::from(pressed), EventKind::Key)
                    }
                    Action::Axis { axis, value } => pad.write(axis.code(), value, EventKind::Absolute),
                    Action::Tap(button) => pad.tap(button.code(), EventKind::Key),
                };
                report(result, "gamepad");
            }
        }
    }

    /// Tap a key on the virtual keyboard regardless of mode
    pub fn tap_keyboard(&self, outputs: &mut OutputSinks, code: u16) {
        report(outputs.keyboard.tap(code, EventKind::Key), "keyboard");
    }
}

fn report(result: Result<(), DeviceError>, sink: &str) {
    if let Err(e) = result {
        warn!("Failed to write to virtual {}: {}", sink, e);
    }
}
