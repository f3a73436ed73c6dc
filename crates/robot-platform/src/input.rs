use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::RobotError;
use crate::key::{Key, Modifiers};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl FromStr for MouseButton {
    type Err = RobotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(MouseButton::Left),
            "right" => Ok(MouseButton::Right),
            "middle" => Ok(MouseButton::Middle),
            _ => Err(RobotError::InvalidButton(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonAction {
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAction {
    Press,
    Release,
}

/// Parse `down`/`up` (or `press`/`release`) into a press flag.
fn parse_toggle(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "down" | "press" => Some(true),
        "up" | "release" => Some(false),
        _ => None,
    }
}

impl FromStr for ButtonAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match parse_toggle(s) {
            Some(true) => Ok(ButtonAction::Press),
            Some(false) => Ok(ButtonAction::Release),
            None => anyhow::bail!("invalid mouse button state {s:?} (expected down or up)"),
        }
    }
}

impl FromStr for KeyAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match parse_toggle(s) {
            Some(true) => Ok(KeyAction::Press),
            Some(false) => Ok(KeyAction::Release),
            None => anyhow::bail!("invalid key state {s:?} (expected down or up)"),
        }
    }
}

/// Synthesizes pointer and keyboard events on the host.
///
/// Every call blocks until the OS has accepted the event. Implementations
/// talk to global OS state (one cursor, one keyboard) and do no locking of
/// their own.
pub trait InputInjector: Send {
    /// Current cursor position in screen coordinates.
    fn mouse_location(&self) -> Result<(i32, i32)>;

    /// Warp the cursor to an absolute position. Callers clamp beforehand.
    fn mouse_move(&mut self, x: u32, y: u32) -> Result<()>;

    fn mouse_button(&mut self, btn: MouseButton, action: ButtonAction) -> Result<()>;

    /// Scroll by notches. Positive `dy` is down, positive `dx` is right.
    fn mouse_scroll(&mut self, dx: i32, dy: i32) -> Result<()>;

    /// Press or release a key. Modifiers go down before a press and come up
    /// after a release. Returns `Ok(false)` when the key has no mapping on
    /// this backend; nothing is sent in that case.
    fn key_event(&mut self, key: Key, action: KeyAction, mods: Modifiers) -> Result<bool>;

    /// Type one character. Returns `Ok(false)` when the backend has no way to
    /// produce it; nothing is sent in that case.
    fn type_char(&mut self, ch: char) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_parse() {
        assert_eq!("left".parse::<MouseButton>().unwrap(), MouseButton::Left);
        assert_eq!("Right".parse::<MouseButton>().unwrap(), MouseButton::Right);
        assert_eq!("MIDDLE".parse::<MouseButton>().unwrap(), MouseButton::Middle);
        assert!(matches!(
            "back".parse::<MouseButton>(),
            Err(RobotError::InvalidButton(name)) if name == "back"
        ));
    }

    #[test]
    fn test_default_button_is_left() {
        assert_eq!(MouseButton::default(), MouseButton::Left);
    }

    #[test]
    fn test_toggle_states() {
        assert_eq!("down".parse::<ButtonAction>().unwrap(), ButtonAction::Press);
        assert_eq!("up".parse::<ButtonAction>().unwrap(), ButtonAction::Release);
        assert_eq!("press".parse::<KeyAction>().unwrap(), KeyAction::Press);
        assert_eq!("UP".parse::<KeyAction>().unwrap(), KeyAction::Release);
        assert!("sideways".parse::<KeyAction>().is_err());
    }
}
