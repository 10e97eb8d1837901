//! Keyboard state for the logical key vocabulary.
//!
//! Physical key codes (`"KeyW"`, `"Digit1"`, `"Space"`, ...) are mapped onto a
//! small fixed set of logical [`Key`]s. Codes outside the map are ignored:
//! they are neither recorded nor reported as handled.

use serde::{Deserialize, Serialize};

const KEY_COUNT: usize = 10;

/// A logical key systems can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    W,
    A,
    S,
    D,
    #[serde(rename = "1")]
    Digit1,
    #[serde(rename = "2")]
    Digit2,
    #[serde(rename = "3")]
    Digit3,
    #[serde(rename = "4")]
    Digit4,
    #[serde(rename = "5")]
    Digit5,
    Space,
}

impl Key {
    /// Every logical key, in slot order.
    pub const ALL: [Key; KEY_COUNT] = [
        Key::W,
        Key::A,
        Key::S,
        Key::D,
        Key::Digit1,
        Key::Digit2,
        Key::Digit3,
        Key::Digit4,
        Key::Digit5,
        Key::Space,
    ];

    /// Map a physical key code to its logical key.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let key = match code {
            "KeyW" => Key::W,
            "KeyA" => Key::A,
            "KeyS" => Key::S,
            "KeyD" => Key::D,
            "Digit1" => Key::Digit1,
            "Digit2" => Key::Digit2,
            "Digit3" => Key::Digit3,
            "Digit4" => Key::Digit4,
            "Digit5" => Key::Digit5,
            "Space" => Key::Space,
            _ => return None,
        };
        Some(key)
    }

    /// Returns the logical name (`"w"`, `"1"`, `"space"`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Key::W => "w",
            Key::A => "a",
            Key::S => "s",
            Key::D => "d",
            Key::Digit1 => "1",
            Key::Digit2 => "2",
            Key::Digit3 => "3",
            Key::Digit4 => "4",
            Key::Digit5 => "5",
            Key::Space => "space",
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

/// Which logical keys are currently held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardState {
    held: [bool; KEY_COUNT],
}

impl KeyboardState {
    /// Create a state with no keys held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a key-down event. Returns `true` if the code is mapped (the
    /// platform should then suppress its default handling).
    pub fn on_key_down(&mut self, code: &str) -> bool {
        self.set(code, true)
    }

    /// Process a key-up event. Returns `true` if the code is mapped.
    pub fn on_key_up(&mut self, code: &str) -> bool {
        self.set(code, false)
    }

    fn set(&mut self, code: &str, down: bool) -> bool {
        match Key::from_code(code) {
            Some(key) => {
                self.held[key.slot()] = down;
                true
            }
            None => false,
        }
    }

    /// Returns `true` while `key` is held.
    #[must_use]
    pub fn is_down(&self, key: Key) -> bool {
        self.held[key.slot()]
    }

    /// Returns the held keys, in vocabulary order.
    pub fn held(&self) -> impl Iterator<Item = Key> + '_ {
        Key::ALL.into_iter().filter(|key| self.is_down(*key))
    }

    /// Release every key.
    pub fn reset(&mut self) {
        self.held = [false; KEY_COUNT];
    }
}
