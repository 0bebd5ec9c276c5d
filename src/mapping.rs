//! Static key-to-action tables for both players
//!
//! The panel reports every control as a keyboard key. Player 1 sits on the
//! left half (arrow keys / keypad, left modifiers), player 2 on the right half
//! (letters). Each key maps to exactly one player.

use evdev::{AbsoluteAxisType, Key};
use std::fmt;
use xarcade_io::{AXIS_CENTER, AXIS_MAX, AXIS_MIN, RELEASE};

/// Which half of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    /// Zero-based index into per-player arrays
    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    /// One-based player number for names and logs
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.number())
    }
}

/// Gamepad buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    C,
    X,
    Y,
    Z,
    TL,
    TR,
    Start,
    Select,
}

impl Button {
    pub fn key(self) -> Key {
        match self {
            Button::A => Key::BTN_SOUTH,
            Button::B => Key::BTN_EAST,
            Button::C => Key::BTN_C,
            Button::X => Key::BTN_NORTH,
            Button::Y => Key::BTN_WEST,
            Button::Z => Key::BTN_Z,
            Button::TL => Key::BTN_TL,
            Button::TR => Key::BTN_TR,
            Button::Start => Key::BTN_START,
            Button::Select => Key::BTN_SELECT,
        }
    }

    pub fn code(self) -> u16 {
        self.key().code()
    }
}

/// Stick axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal, negative = left
    X,
    /// Vertical, negative = up
    Y,
}

impl Axis {
    pub fn code(self) -> u16 {
        match self {
            Axis::X => AbsoluteAxisType::ABS_X.0,
            Axis::Y => AbsoluteAxisType::ABS_Y.0,
        }
    }
}

/// Which end of an axis a direction key pushes toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Negative,
    Positive,
}

impl Direction {
    /// Axis value while the key is held
    pub fn held_value(self) -> i32 {
        match self {
            Direction::Negative => AXIS_MIN,
            Direction::Positive => AXIS_MAX,
        }
    }
}

/// What a physical key controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Held button: follows the key
    Button(Button),
    /// Direction key on a tri-state axis
    Axis(Axis, Direction),
    /// Button tapped once when the key is released
    Tap(Button),
}

/// A resolved output action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Button { button: Button, pressed: bool },
    Axis { axis: Axis, value: i32 },
    Tap(Button),
}

impl Target {
    /// Turn a raw key value into an action
    ///
    /// Releasing either direction key of an axis recenters it, even if the
    /// opposite key is still down. The stick cannot physically assert both.
    pub fn resolve(&self, value: i32) -> Option<Action> {
        match *self {
            Target::Button(button) => Some(Action::Button {
                button,
                pressed: value > 0,
            }),
            Target::Axis(axis, direction) => Some(Action::Axis {
                axis,
                value: if value == RELEASE {
                    AXIS_CENTER
                } else {
                    direction.held_value()
                },
            }),
            Target::Tap(button) if value == RELEASE => Some(Action::Tap(button)),
            Target::Tap(_) => None,
        }
    }
}

/// One table row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub key: Key,
    pub player: Player,
    pub target: Target,
}

const fn bind(key: Key, player: Player, target: Target) -> Binding {
    Binding {
        key,
        player,
        target,
    }
}

use Direction::{Negative, Positive};
use Player::{One, Two};

/// Player 1: left side of the panel
pub static PLAYER_ONE: [Binding; 18] = [
    bind(Key::KEY_LEFTCTRL, One, Target::Button(Button::A)),
    bind(Key::KEY_LEFTALT, One, Target::Button(Button::B)),
    bind(Key::KEY_SPACE, One, Target::Button(Button::C)),
    bind(Key::KEY_LEFTSHIFT, One, Target::Button(Button::X)),
    bind(Key::KEY_Z, One, Target::Button(Button::Y)),
    bind(Key::KEY_X, One, Target::Button(Button::Z)),
    bind(Key::KEY_C, One, Target::Button(Button::TL)),
    bind(Key::KEY_5, One, Target::Button(Button::TR)),
    bind(Key::KEY_1, One, Target::Tap(Button::Start)),
    bind(Key::KEY_3, One, Target::Tap(Button::Select)),
    // Stick: keypad codes in numlock mode, arrows otherwise
    bind(Key::KEY_KP4, One, Target::Axis(Axis::X, Negative)),
    bind(Key::KEY_LEFT, One, Target::Axis(Axis::X, Negative)),
    bind(Key::KEY_KP6, One, Target::Axis(Axis::X, Positive)),
    bind(Key::KEY_RIGHT, One, Target::Axis(Axis::X, Positive)),
    bind(Key::KEY_KP8, One, Target::Axis(Axis::Y, Negative)),
    bind(Key::KEY_UP, One, Target::Axis(Axis::Y, Negative)),
    bind(Key::KEY_KP2, One, Target::Axis(Axis::Y, Positive)),
    bind(Key::KEY_DOWN, One, Target::Axis(Axis::Y, Positive)),
];

/// Player 2: right side of the panel
pub static PLAYER_TWO: [Binding; 14] = [
    bind(Key::KEY_A, Two, Target::Button(Button::A)),
    bind(Key::KEY_S, Two, Target::Button(Button::B)),
    bind(Key::KEY_Q, Two, Target::Button(Button::C)),
    bind(Key::KEY_W, Two, Target::Button(Button::X)),
    bind(Key::KEY_E, Two, Target::Button(Button::Y)),
    bind(Key::KEY_LEFTBRACE, Two, Target::Button(Button::Z)),
    bind(Key::KEY_RIGHTBRACE, Two, Target::Button(Button::TL)),
    bind(Key::KEY_6, Two, Target::Button(Button::TR)),
    bind(Key::KEY_2, Two, Target::Tap(Button::Start)),
    bind(Key::KEY_4, Two, Target::Tap(Button::Select)),
    bind(Key::KEY_D, Two, Target::Axis(Axis::X, Negative)),
    bind(Key::KEY_G, Two, Target::Axis(Axis::X, Positive)),
    bind(Key::KEY_R, Two, Target::Axis(Axis::Y, Negative)),
    bind(Key::KEY_F, Two, Target::Axis(Axis::Y, Positive)),
];

/// Table for one player
pub fn table(player: Player) -> &'static [Binding] {
    match player {
        Player::One => &PLAYER_ONE,
        Player::Two => &PLAYER_TWO,
    }
}

/// Find the binding for a key code in either table
pub fn lookup(code: u16) -> Option<&'static Binding> {
    Player::ALL
        .iter()
        .flat_map(|&p| table(p).iter())
        .find(|b| b.key.code() == code)
}

/// Resolve a key event against one player's table
///
/// Returns `None` for codes that player does not use, and for presses of
/// release-fired tap keys.
pub fn resolve(player: Player, code: u16, value: i32) -> Option<Action> {
    table(player)
        .iter()
        .find(|b| b.key.code() == code)
        .and_then(|b| b.target.resolve(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use xarcade_io::{PRESS, REPEAT};

    #[test]
    fn test_every_key_belongs_to_one_player() {
        let mut seen = HashSet::new();
        for binding in PLAYER_ONE.iter().chain(PLAYER_TWO.iter()) {
            assert!(seen.insert(binding.key), "{:?} bound twice", binding.key);
        }
        assert!(PLAYER_ONE.iter().all(|b| b.player == Player::One));
        assert!(PLAYER_TWO.iter().all(|b| b.player == Player::Two));
    }

    #[test]
    fn test_buttons_follow_key() {
        let code = Key::KEY_LEFTCTRL.code();
        assert_eq!(
            resolve(Player::One, code, PRESS),
            Some(Action::Button { button: Button::A, pressed: true })
        );
        assert_eq!(
            resolve(Player::One, code, REPEAT),
            Some(Action::Button { button: Button::A, pressed: true })
        );
        assert_eq!(
            resolve(Player::One, code, RELEASE),
            Some(Action::Button { button: Button::A, pressed: false })
        );
    }

    #[test]
    fn test_axis_tri_state() {
        let left = Key::KEY_LEFT.code();
        let right = Key::KEY_RIGHT.code();
        assert_eq!(
            resolve(Player::One, left, PRESS),
            Some(Action::Axis { axis: Axis::X, value: AXIS_MIN })
        );
        assert_eq!(
            resolve(Player::One, left, RELEASE),
            Some(Action::Axis { axis: Axis::X, value: AXIS_CENTER })
        );
        assert_eq!(
            resolve(Player::One, right, PRESS),
            Some(Action::Axis { axis: Axis::X, value: AXIS_MAX })
        );
    }

    #[test]
    fn test_releasing_either_direction_recenters() {
        // Right released while left might still be held: still centers
        assert_eq!(
            resolve(Player::Two, Key::KEY_G.code(), RELEASE),
            Some(Action::Axis { axis: Axis::X, value: AXIS_CENTER })
        );
    }

    #[test]
    fn test_taps_fire_on_release_only() {
        let code = Key::KEY_2.code();
        assert_eq!(resolve(Player::Two, code, PRESS), None);
        assert_eq!(resolve(Player::Two, code, RELEASE), Some(Action::Tap(Button::Start)));
    }

    #[test]
    fn test_unmapped_codes_resolve_to_nothing() {
        for player in Player::ALL {
            assert_eq!(resolve(player, Key::KEY_ENTER.code(), PRESS), None);
            assert_eq!(resolve(player, Key::KEY_ESC.code(), RELEASE), None);
        }
        assert!(lookup(Key::KEY_ENTER.code()).is_none());
    }

    #[test]
    fn test_keys_do_not_cross_players() {
        assert_eq!(resolve(Player::Two, Key::KEY_LEFTCTRL.code(), PRESS), None);
        assert_eq!(lookup(Key::KEY_A.code()).map(|b| b.player), Some(Player::Two));
    }
}
