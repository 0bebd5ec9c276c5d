//! Unix signal handling
//!
//! - `SIGUSR1` switches to gamepad mode
//! - `SIGUSR2` switches to MAME mode
//! - `SIGINT` / `SIGTERM` request a graceful shutdown
//!
//! Mode switches write the shared [`ModeCell`] directly. Shutdown goes through
//! the control channel so only the read loop tears down.
//!
//! Until the listener exists these signals are held with [`hold`], so one
//! arriving during startup is delivered to the listener instead of killing the
//! process.

use crate::lifecycle::Control;
use crate::mode::{Mode, ModeCell};
use std::io;
use std::ops::ControlFlow;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// External request delivered by a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    ForceGamepad,
    ForceMame,
    Interrupt,
    Terminate,
}

impl Trigger {
    pub fn signal_name(&self) -> &'static str {
        match self {
            Trigger::ForceGamepad => "SIGUSR1",
            Trigger::ForceMame => "SIGUSR2",
            Trigger::Interrupt => "SIGINT",
            Trigger::Terminate => "SIGTERM",
        }
    }
}

/// Act on one trigger
///
/// Breaks once the read loop is no longer listening.
pub fn apply(
    trigger: Trigger,
    mode: &ModeCell,
    control: &mpsc::UnboundedSender<Control>,
) -> ControlFlow<()> {
    let target = match trigger {
        Trigger::ForceGamepad => Mode::Gamepad,
        Trigger::ForceMame => Mode::Mame,
        Trigger::Interrupt | Trigger::Terminate => {
            return match control.send(Control::Shutdown(trigger.signal_name())) {
                Ok(()) => ControlFlow::Continue(()),
                Err(_) => ControlFlow::Break(()),
            };
        }
    };

    let previous = mode.store(target);
    if previous != target {
        info!("{}: switched from {} to {} mode", trigger.signal_name(), previous, target);
    } else {
        debug!("{}: already in {} mode", trigger.signal_name(), target);
    }
    ControlFlow::Continue(())
}

/// Signals the listener handles
const HANDLED: [libc::c_int; 4] = [libc::SIGUSR1, libc::SIGUSR2, libc::SIGINT, libc::SIGTERM];

/// Handled signals blocked on the current thread; the previous mask is
/// restored on drop
///
/// Threads spawned while held inherit the block.
pub struct HeldSignals {
    previous: libc::sigset_t,
}

/// Block the handled signals on the current thread
///
/// Signals arriving meanwhile stay pending and are delivered once the
/// returned guard is dropped.
pub fn hold() -> io::Result<HeldSignals> {
    // SAFETY: both sets are initialised by sigemptyset before use
    unsafe {
        let mut set: libc::sigset_t = std::mem::zeroed();
        libc::sigemptyset(&mut set);
        for sig in HANDLED {
            libc::sigaddset(&mut set, sig);
        }
        let mut previous: libc::sigset_t = std::mem::zeroed();
        libc::sigemptyset(&mut previous);
        let rc = libc::pthread_sigmask(libc::SIG_BLOCK, &set, &mut previous);
        if rc != 0 {
            return Err(io::Error::from_raw_os_error(rc));
        }
        Ok(HeldSignals { previous })
    }
}

impl Drop for HeldSignals {
    fn drop(&mut self) {
        // SAFETY: `previous` was filled in by pthread_sigmask
        let rc = unsafe { libc::pthread_sigmask(libc::SIG_SETMASK, &self.previous, std::ptr::null_mut()) };
        if rc != 0 {
            warn!("Failed to restore signal mask: {}", io::Error::from_raw_os_error(rc));
        }
    }
}

/// Install the signal streams and start the listener task
///
/// Must be called from within a tokio runtime.
pub fn spawn_listener(
    mode: ModeCell,
    control: mpsc::UnboundedSender<Control>,
) -> std::io::Result<JoinHandle<()>> {
    let mut usr1 = signal(SignalKind::user_defined1())?;
    let mut usr2 = signal(SignalKind::user_defined2())?;
    let mut int = signal(SignalKind::interrupt())?;
    let mut term = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        loop {
            let trigger = tokio::select! {
                Some(()) = usr1.recv() => Trigger::ForceGamepad,
                Some(()) = usr2.recv() => Trigger::ForceMame,
                Some(()) = int.recv() => Trigger::Interrupt,
                Some(()) = term.recv() => Trigger::Terminate,
                else => break,
            };
            if apply(trigger, &mode, &control).is_break() {
                break;
            }
        }
        debug!("Signal listener stopped");
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_signals_switch_mode() {
        let mode = ModeCell::new(Mode::Gamepad);
        let (tx, mut rx) = mpsc::unbounded_channel();

        assert!(apply(Trigger::ForceMame, &mode, &tx).is_continue());
        assert_eq!(mode.load(), Mode::Mame);
        assert!(apply(Trigger::ForceMame, &mode, &tx).is_continue());
        assert_eq!(mode.load(), Mode::Mame);
        assert!(apply(Trigger::ForceGamepad, &mode, &tx).is_continue());
        assert_eq!(mode.load(), Mode::Gamepad);

        // Mode switches never reach the read loop
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_termination_requests_shutdown() {
        let mode = ModeCell::new(Mode::Gamepad);
        let (tx, mut rx) = mpsc::unbounded_channel();

        assert!(apply(Trigger::Terminate, &mode, &tx).is_continue());
        assert_eq!(rx.try_recv().unwrap(), Control::Shutdown("SIGTERM"));
        assert_eq!(mode.load(), Mode::Gamepad);
    }

    #[test]
    fn test_stops_when_loop_is_gone() {
        let mode = ModeCell::new(Mode::Gamepad);
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        assert!(apply(Trigger::Interrupt, &mode, &tx).is_break());
    }

    fn is_blocked(sig: libc::c_int) -> bool {
        unsafe {
            let mut current: libc::sigset_t = std::mem::zeroed();
            libc::sigemptyset(&mut current);
            assert_eq!(libc::pthread_sigmask(libc::SIG_BLOCK, std::ptr::null(), &mut current), 0);
            libc::sigismember(&current, sig) == 1
        }
    }

    #[test]
    fn test_hold_blocks_until_dropped() {
        // Masks are per thread, so keep this off the test harness thread
        std::thread::spawn(|| {
            assert!(!is_blocked(libc::SIGTERM));
            let held = hold().unwrap();
            assert!(HANDLED.iter().all(|&sig| is_blocked(sig)));
            assert!(!is_blocked(libc::SIGHUP));
            drop(held);
            assert!(!is_blocked(libc::SIGTERM));
            assert!(!is_blocked(libc::SIGUSR1));
        })
        .join()
        .unwrap();
    }
}
