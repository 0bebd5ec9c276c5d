//! Device acquisition, the read loop and teardown
//!
//! ```text
//! Starting --run()--> Running --signal / read error--> Stopping --> Stopped
//! ```
//!
//! The controller is the only owner of the device handles. Shutdown requests
//! arrive on a channel that the loop waits on together with the input device,
//! and is polled again before every event so a request lands mid-batch.

use crate::config::RemapConfig;
use crate::dispatch::OutputSinks;
use crate::mapping::Player;
use crate::remap::Remapper;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{info, warn};
use xarcade_io::{
    BoxedSource, DeviceError, EvdevSource, VirtualGamepad, VirtualKeyboard,
};

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// Messages for the read loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Stop and tear down; carries the name of the trigger
    Shutdown(&'static str),
}

/// Why the read loop ended
#[derive(Debug)]
pub enum ExitReason {
    /// A shutdown request was received
    Requested(&'static str),
    /// The input device failed or went away
    SourceLost(DeviceError),
}

impl ExitReason {
    /// Both are orderly terminations
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::SUCCESS
    }
}

/// Everything acquired at startup
pub struct DeviceHandles {
    pub source: BoxedSource,
    pub outputs: OutputSinks,
}

impl DeviceHandles {
    pub fn new(source: BoxedSource, outputs: OutputSinks) -> Self {
        Self { source, outputs }
    }

    /// Grab the panel and create the virtual devices described by `config`
    pub fn open(config: &RemapConfig) -> Result<Self, DeviceError> {
        info!("Getting exclusive access to {}", config.device.display());
        let source = EvdevSource::open(&config.device, config.name_filter())?;

        let delay = config.settle_delay();
        let keyboard = VirtualKeyboard::new(&config.keyboard_name, delay)?;
        let player_one = VirtualGamepad::new(&config.gamepad_device_name(Player::One), delay)?;
        let player_two = VirtualGamepad::new(&config.gamepad_device_name(Player::Two), delay)?;
        info!(
            "Created \"{}\", \"{}\" and \"{}\"",
            keyboard.name(),
            player_one.name(),
            player_two.name()
        );

        Ok(Self::new(
            Box::new(source),
            OutputSinks::new(Box::new(keyboard), Box::new(player_one), Box::new(player_two)),
        ))
    }

    /// Release the source and every sink, logging failures
    fn release(mut self) {
        if let Err(e) = self.source.release() {
            warn!("Failed to release input device: {}", e);
        }
        for (name, e) in self.outputs.release_all() {
            warn!("Failed to release virtual {}: {}", name, e);
        }
    }
}

/// Runs the read loop and owns teardown
pub struct Controller {
    state: LifecycleState,
    handles: Option<DeviceHandles>,
    remapper: Remapper,
}

impl Controller {
    pub fn new(handles: DeviceHandles, remapper: Remapper) -> Self {
        Self {
            state: LifecycleState::Starting,
            handles: Some(handles),
            remapper,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn remapper(&self) -> &Remapper {
        &self.remapper
    }

    /// Read and remap until shutdown is requested or the device fails
    ///
    /// Tears down before returning.
    pub async fn run(&mut self, control: &mut mpsc::UnboundedReceiver<Control>) -> ExitReason {
        if self.state != LifecycleState::Starting {
            return ExitReason::SourceLost(DeviceError::Released);
        }
        self.state = LifecycleState::Running;
        info!("Running in {} mode.", self.remapper.mode().load());

        let mut control_open = true;
        let reason = 'outer: loop {
            let Some(handles) = self.handles.as_mut() else {
                break 'outer ExitReason::SourceLost(DeviceError::Released);
            };

            let batch = tokio::select! {
                biased;
                msg = control.recv(), if control_open => match msg {
                    Some(Control::Shutdown(trigger)) => break 'outer ExitReason::Requested(trigger),
                    None => {
                        control_open = false;
                        continue 'outer;
                    }
                },
                read = handles.source.read_batch() => match read {
                    Ok(batch) => batch,
                    Err(e) => break 'outer ExitReason::SourceLost(e),
                },
            };

            for event in &batch {
                if let Ok(Control::Shutdown(trigger)) = control.try_recv() {
                    break 'outer ExitReason::Requested(trigger);
                }
                self.remapper.handle_event(event, &mut handles.outputs);
            }
        };

        match &reason {
            ExitReason::Requested(trigger) => info!("Received {}, exiting.", trigger),
            ExitReason::SourceLost(e) => warn!("Input device lost: {}", e),
        }
        self.shutdown();
        reason
    }

    /// Release all devices once
    ///
    /// Returns `false` if teardown already began.
    pub fn shutdown(&mut self) -> bool {
        if matches!(self.state, LifecycleState::Stopping | LifecycleState::Stopped) {
            return false;
        }
        self.state = LifecycleState::Stopping;
        if let Some(handles) = self.handles.take() {
            handles.release();
        }
        self.state = LifecycleState::Stopped;
        info!("Exiting.");
        true
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Detach from the controlling terminal
///
/// Must be called before any threads (including the async runtime) exist.
/// Standard streams stay open so stderr logging keeps working.
pub fn detach() -> std::io::Result<()> {
    // SAFETY: no other threads are running yet, so forking is sound
    if unsafe { libc::daemon(0, 1) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{Mode, ModeCell};
    use evdev::Key;
    use std::sync::atomic::Ordering;
    use xarcade_io::{KeyEvent, MemorySink, ScriptedSource, SinkLog};

    fn controller(source: ScriptedSource) -> (Controller, [SinkLog; 3]) {
        let (kb, kb_log) = MemorySink::new();
        let (p1, p1_log) = MemorySink::new();
        let (p2, p2_log) = MemorySink::new();
        let handles = DeviceHandles::new(
            Box::new(source),
            OutputSinks::new(Box::new(kb), Box::new(p1), Box::new(p2)),
        );
        (
            Controller::new(handles, Remapper::new(ModeCell::new(Mode::Gamepad))),
            [kb_log, p1_log, p2_log],
        )
    }

    #[test]
    fn test_shutdown_is_single_shot() {
        let source = ScriptedSource::new(Vec::new());
        let source_releases = source.release_counter();
        let (mut ctl, logs) = controller(source);

        assert!(ctl.shutdown());
        assert!(!ctl.shutdown());
        drop(ctl);

        assert_eq!(source_releases.load(Ordering::SeqCst), 1);
        assert!(logs.iter().all(|log| log.release_count() == 1));
    }

    #[test]
    fn test_drop_tears_down() {
        let source = ScriptedSource::new(Vec::new());
        let source_releases = source.release_counter();
        let (ctl, logs) = controller(source);
        assert_eq!(ctl.state(), LifecycleState::Starting);

        drop(ctl);

        assert_eq!(source_releases.load(Ordering::SeqCst), 1);
        assert!(logs.iter().all(|log| log.release_count() == 1));
    }

    #[tokio::test]
    async fn test_read_failure_stops_the_loop() {
        let ctrl = Key::KEY_LEFTCTRL.code();
        let source = ScriptedSource::new(vec![vec![KeyEvent::press(ctrl)]]);
        let (mut ctl, [_, p1, _]) = controller(source);
        let (_tx, mut rx) = mpsc::unbounded_channel();

        let reason = ctl.run(&mut rx).await;

        assert!(matches!(reason, ExitReason::SourceLost(DeviceError::Disconnected)));
        assert_eq!(ctl.state(), LifecycleState::Stopped);
        assert_eq!(p1.writes().len(), 1);
        assert_eq!(p1.release_count(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_request_while_idle() {
        let source = ScriptedSource::new(Vec::new()).then_block();
        let (mut ctl, [kb, _, _]) = controller(source);
        let (tx, mut rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            tx.send(Control::Shutdown("SIGTERM")).unwrap();
        });
        let reason = ctl.run(&mut rx).await;

        assert!(matches!(reason, ExitReason::Requested("SIGTERM")));
        assert_eq!(kb.release_count(), 1);
    }

    #[tokio::test]
    async fn test_closed_control_channel_keeps_reading() {
        let ctrl = Key::KEY_LEFTCTRL.code();
        let source = ScriptedSource::new(vec![
            vec![KeyEvent::press(ctrl)],
            vec![KeyEvent::release(ctrl)],
        ]);
        let (mut ctl, [_, p1, _]) = controller(source);
        let (tx, mut rx) = mpsc::unbounded_channel::<Control>();
        drop(tx);

        let reason = ctl.run(&mut rx).await;

        assert!(matches!(reason, ExitReason::SourceLost(_)));
        assert_eq!(p1.writes().len(), 2);
    }

    #[tokio::test]
    async fn test_run_after_shutdown_does_nothing() {
        let source = ScriptedSource::new(vec![vec![KeyEvent::press(Key::KEY_A.code())]]);
        let (mut ctl, [_, _, p2]) = controller(source);
        ctl.shutdown();
        let (_tx, mut rx) = mpsc::unbounded_channel();

        let reason = ctl.run(&mut rx).await;

        assert!(matches!(reason, ExitReason::SourceLost(DeviceError::Released)));
        assert!(p2.writes().is_empty());
    }
}
