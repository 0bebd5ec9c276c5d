//! Per-event remapping pipeline
//!
//! key state -> chord detector -> mapping tables -> dispatcher

use crate::chord::{ChordDetector, ChordOutcome, CHORD_OUTPUT};
use crate::dispatch::{Dispatcher, OutputSinks};
use crate::key_state::KeyStateTracker;
use crate::mapping::{self, Player};
use crate::mode::ModeCell;
use tracing::{debug, trace};
use xarcade_io::KeyEvent;

/// Owns all remapping state
#[derive(Debug, Clone)]
pub struct Remapper {
    keys: KeyStateTracker,
    chords: ChordDetector,
    dispatcher: Dispatcher,
}

impl Remapper {
    pub fn new(mode: ModeCell) -> Self {
        Self {
            keys: KeyStateTracker::new(),
            chords: ChordDetector::new(),
            dispatcher: Dispatcher::new(mode),
        }
    }

    /// Process one event from the panel
    pub fn handle_event(&mut self, event: &KeyEvent, outputs: &mut OutputSinks) {
        if !event.is_key() {
            return;
        }
        self.keys.record(event.code, event.value);

        match self.chords.inspect(event, &self.keys) {
            ChordOutcome::Fire(player) => {
                debug!("{} chord: sending {:?}", player, CHORD_OUTPUT);
                self.dispatcher.tap_keyboard(outputs, CHORD_OUTPUT.code());
                return;
            }
            ChordOutcome::Suppressed => {
                trace!("Swallowed chord release of {}", event.code);
                return;
            }
            ChordOutcome::Inert => return,
            ChordOutcome::NotMember | ChordOutcome::Release => {}
        }

        let Some(player) = mapping::lookup(event.code).map(|binding| binding.player) else {
            trace!("Unmapped key {} dropped", event.code);
            return;
        };
        if let Some(action) = mapping::resolve(player, event.code, event.value) {
            self.dispatcher.dispatch(outputs, player, action, event);
        }
    }

    /// Process a batch in order
    pub fn handle_batch(&mut self, batch: &[KeyEvent], outputs: &mut OutputSinks) {
        for event in batch {
            self.handle_event(event, outputs);
        }
    }

    pub fn mode(&self) -> &ModeCell {
        self.dispatcher.mode()
    }

    /// Chord releases still to be swallowed for `player`
    pub fn pending_suppression(&self, player: Player) -> u8 {
        self.chords.pending(player)
    }
}
