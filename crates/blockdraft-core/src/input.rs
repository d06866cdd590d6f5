//! Pointer and keyboard input as delivered by the host.

use crate::error::{EditorError, EditorResult};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    /// True if any modifier is held.
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Pointer event in container coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down {
        position: Point,
        #[serde(default)]
        button: MouseButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Move {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Up {
        position: Point,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position, .. }
            | PointerEvent::Up { position } => *position,
        }
    }
}

/// A key press.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    /// Key name as reported by the host (`"z"`, `"ArrowUp"`, `"Delete"`).
    pub key: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Keyboard focus sits on something other than the editing surface.
    #[serde(default)]
    pub focus_elsewhere: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            focus_elsewhere: false,
        }
    }
}

/// Canonical lowercase key name.
fn normalize_key(key: &str) -> String {
    let key = key.trim().to_ascii_lowercase();
    match key.as_str() {
        "arrowup" => "up".to_string(),
        "arrowdown" => "down".to_string(),
        "arrowleft" => "left".to_string(),
        "arrowright" => "right".to_string(),
        "esc" => "escape".to_string(),
        "del" => "delete".to_string(),
        _ => key,
    }
}

/// A keyboard binding such as `ctrl+shift+z`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
    pub key: String,
}

impl KeyCombo {
    /// Whether a key press triggers this binding.
    ///
    /// Ctrl, shift and alt must match exactly. Meta is only checked when the
    /// binding asks for it.
    pub fn matches(&self, input: &KeyInput) -> bool {
        let m = input.modifiers;
        normalize_key(&input.key) == self.key
            && m.ctrl == self.ctrl
            && m.shift == self.shift
            && m.alt == self.alt
            && (!self.meta || m.meta)
    }

    /// Parse a list of bindings.
    pub fn parse_all(bindings: &[&str]) -> EditorResult<Vec<KeyCombo>> {
        bindings.iter().map(|b| b.parse()).collect()
    }
}

impl FromStr for KeyCombo {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut combo = KeyCombo {
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
            key: String::new(),
        };
        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let Some((key, mods)) = parts.split_last() else {
            return Err(EditorError::InvalidKeyBinding(s.to_string()));
        };
        for m in mods {
            match m.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => combo.ctrl = true,
                "shift" => combo.shift = true,
                "alt" | "option" => combo.alt = true,
                "meta" | "cmd" | "super" => combo.meta = true,
                _ => return Err(EditorError::InvalidKeyBinding(s.to_string())),
            }
        }
        if key.is_empty() {
            return Err(EditorError::InvalidKeyBinding(s.to_string()));
        }
        combo.key = normalize_key(key);
        Ok(combo)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "ctrl+")?;
        }
        if self.shift {
            write!(f, "shift+")?;
        }
        if self.alt {
            write!(f, "alt+")?;
        }
        if self.meta {
            write!(f, "meta+")?;
        }
        write!(f, "{}", self.key)
    }
}
