//! X-Arcade control panel remapper
//!
//! Turns the keyboard-style events of a two-player X-Arcade panel into either
//! two virtual gamepads or a passthrough keyboard for MAME.
//!
//! Each event flows through:
//!
//! - [`key_state::KeyStateTracker`] - last value of every key code
//! - [`chord::ChordDetector`] - Start+Select chords become Escape
//! - [`mapping`] - fixed per-player tables
//! - [`dispatch::Dispatcher`] - routes by the current [`mode::Mode`]
//!
//! [`lifecycle::Controller`] owns the devices and the read loop, and
//! [`signals`] lets other processes switch modes or stop it.

pub mod chord;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod key_state;
pub mod lifecycle;
pub mod logging;
pub mod mapping;
pub mod mode;
pub mod remap;
pub mod signals;

pub use config::{ConfigError, RemapConfig};
pub use dispatch::{Dispatcher, OutputSinks};
pub use lifecycle::{Control, Controller, DeviceHandles, ExitReason, LifecycleState};
pub use mode::{Mode, ModeCell};
pub use remap::Remapper;
