//! Last seen value of every key on the panel

use xarcade_io::RELEASE;

/// Number of key codes the kernel defines (`KEY_CNT`)
pub const KEY_CNT: usize = 0x300;

/// Fixed-size table of the most recent value per key code
///
/// Codes never seen read as released. Codes at or above [`KEY_CNT`] are
/// ignored.
#[derive(Debug, Clone)]
pub struct KeyStateTracker {
    values: Box<[i32; KEY_CNT]>,
}

impl KeyStateTracker {
    pub fn new() -> Self {
        Self {
            values: Box::new([RELEASE; KEY_CNT]),
        }
    }

    /// Overwrite the stored value for `code`
    pub fn record(&mut self, code: u16, value: i32) {
        if let Some(slot) = self.values.get_mut(code as usize) {
            *slot = value;
        }
    }

    /// Whether the last value for `code` was a press or repeat
    pub fn is_pressed(&self, code: u16) -> bool {
        self.value(code) != RELEASE
    }

    pub fn value(&self, code: u16) -> i32 {
        self.values.get(code as usize).copied().unwrap_or(RELEASE)
    }
}

impl Default for KeyStateTracker {
    fn default() -> Self {
        Self::new()
    }
}
