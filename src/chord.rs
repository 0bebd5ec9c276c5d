//! Start+Select chord detection
//!
//! Holding a player's Start and Select keys together produces one Escape tap
//! (emulator menu / exit). The two chord keys otherwise act as release-fired
//! taps, so after a chord fires the releases of both keys are swallowed with a
//! per-player countdown instead of tracking which key went down first.

use crate::key_state::KeyStateTracker;
use crate::mapping::Player;
use evdev::Key;
use xarcade_io::KeyEvent;

/// Key emitted when a chord fires
pub const CHORD_OUTPUT: Key = Key::KEY_ESC;

/// Releases swallowed after a chord: one per chord key
const CHORD_SUPPRESS: u8 = 2;

/// Start/Select keys of one player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordPair {
    pub player: Player,
    pub start: Key,
    pub select: Key,
}

impl ChordPair {
    /// The other key of the pair, if `code` belongs to it
    pub fn partner(&self, code: u16) -> Option<Key> {
        if code == self.start.code() {
            Some(self.select)
        } else if code == self.select.code() {
            Some(self.start)
        } else {
            None
        }
    }
}

pub static CHORDS: [ChordPair; 2] = [
    ChordPair {
        player: Player::One,
        start: Key::KEY_1,
        select: Key::KEY_3,
    },
    ChordPair {
        player: Player::Two,
        start: Key::KEY_2,
        select: Key::KEY_4,
    },
];

/// What the detector decided for one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordOutcome {
    /// Not a chord key, map normally
    NotMember,
    /// Chord completed: emit [`CHORD_OUTPUT`], drop the event
    Fire(Player),
    /// Plain press of a chord key: drop
    Inert,
    /// Release swallowed after a chord: drop
    Suppressed,
    /// Release with nothing pending: map normally (fires the tap)
    Release,
}

impl ChordOutcome {
    /// Whether the event continues to the mapping tables
    pub fn passes(&self) -> bool {
        matches!(self, ChordOutcome::NotMember | ChordOutcome::Release)
    }
}

/// Per-player suppression counters
#[derive(Debug, Clone, Default)]
pub struct ChordDetector {
    suppress: [u8; 2],
}

impl ChordDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a key event
    ///
    /// `keys` must already contain this event so the partner's state is current.
    pub fn inspect(&mut self, event: &KeyEvent, keys: &KeyStateTracker) -> ChordOutcome {
        let Some((pair, partner)) = CHORDS
            .iter()
            .find_map(|pair| pair.partner(event.code).map(|partner| (*pair, partner)))
        else {
            return ChordOutcome::NotMember;
        };
        let counter = &mut self.suppress[pair.player.index()];

        if event.is_press() {
            if keys.is_pressed(partner.code()) {
                *counter = CHORD_SUPPRESS;
                return ChordOutcome::Fire(pair.player);
            }
            return ChordOutcome::Inert;
        }

        if *counter > 0 {
            *counter -= 1;
            ChordOutcome::Suppressed
        } else {
            ChordOutcome::Release
        }
    }

    /// Releases still to be swallowed for `player`
    pub fn pending(&self, player: Player) -> u8 {
        self.suppress[player.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(detector: &mut ChordDetector, keys: &mut KeyStateTracker, ev: KeyEvent) -> ChordOutcome {
        keys.record(ev.code, ev.value);
        detector.inspect(&ev, keys)
    }

    #[test]
    fn test_lone_press_is_inert_and_release_taps() {
        let mut detector = ChordDetector::new();
        let mut keys = KeyStateTracker::new();
        let start = Key::KEY_1.code();

        assert_eq!(feed(&mut detector, &mut keys, KeyEvent::press(start)), ChordOutcome::Inert);
        assert_eq!(feed(&mut detector, &mut keys, KeyEvent::release(start)), ChordOutcome::Release);
    }

    #[test]
    fn test_chord_fires_and_swallows_both_releases() {
        let mut detector = ChordDetector::new();
        let mut keys = KeyStateTracker::new();
        let (start, select) = (Key::KEY_1.code(), Key::KEY_3.code());

        feed(&mut detector, &mut keys, KeyEvent::press(select));
        assert_eq!(
            feed(&mut detector, &mut keys, KeyEvent::press(start)),
            ChordOutcome::Fire(Player::One)
        );
        assert_eq!(detector.pending(Player::One), 2);

        assert_eq!(feed(&mut detector, &mut keys, KeyEvent::release(select)), ChordOutcome::Suppressed);
        assert_eq!(feed(&mut detector, &mut keys, KeyEvent::release(start)), ChordOutcome::Suppressed);
        assert_eq!(detector.pending(Player::One), 0);

        // Counter exhausted: the next release is an ordinary tap again
        feed(&mut detector, &mut keys, KeyEvent::press(start));
        assert_eq!(feed(&mut detector, &mut keys, KeyEvent::release(start)), ChordOutcome::Release);
    }

    #[test]
    fn test_either_member_completes_the_chord() {
        let mut detector = ChordDetector::new();
        let mut keys = KeyStateTracker::new();

        feed(&mut detector, &mut keys, KeyEvent::press(Key::KEY_2.code()));
        assert_eq!(
            feed(&mut detector, &mut keys, KeyEvent::press(Key::KEY_4.code())),
            ChordOutcome::Fire(Player::Two)
        );
    }

    #[test]
    fn test_players_count_independently() {
        let mut detector = ChordDetector::new();
        let mut keys = KeyStateTracker::new();

        feed(&mut detector, &mut keys, KeyEvent::press(Key::KEY_3.code()));
        feed(&mut detector, &mut keys, KeyEvent::press(Key::KEY_1.code()));
        assert_eq!(detector.pending(Player::One), 2);
        assert_eq!(detector.pending(Player::Two), 0);

        // Player 2's Start release is not eaten by player 1's chord
        feed(&mut detector, &mut keys, KeyEvent::press(Key::KEY_2.code()));
        assert_eq!(
            feed(&mut detector, &mut keys, KeyEvent::release(Key::KEY_2.code())),
            ChordOutcome::Release
        );
        assert_eq!(detector.pending(Player::One), 2);
    }

    #[test]
    fn test_other_keys_are_not_members() {
        let mut detector = ChordDetector::new();
        let mut keys = KeyStateTracker::new();
        let outcome = feed(&mut detector, &mut keys, KeyEvent::press(Key::KEY_LEFTCTRL.code()));
        assert_eq!(outcome, ChordOutcome::NotMember);
        assert!(outcome.passes());
    }
}
