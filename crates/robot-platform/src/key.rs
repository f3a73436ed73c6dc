//! Key names accepted by `key_tap` / `key_toggle`.
//!
//! Names are case-insensitive. A single character names itself; anything
//! longer has to be one of the named keys below.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RobotError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// A printable character, typed through the current layout.
    Char(char),
    Enter,
    Tab,
    Space,
    Backspace,
    Escape,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    /// F1 through F12.
    F(u8),
    Shift,
    Control,
    Alt,
    Command,
    CapsLock,
    PrintScreen,
    AudioMute,
    AudioVolumeDown,
    AudioVolumeUp,
    AudioPlay,
    AudioPause,
    AudioNext,
    AudioPrev,
}

impl Key {
    pub fn parse(name: &str) -> Result<Key, RobotError> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return match c {
                ' ' => Ok(Key::Space),
                '\n' | '\r' => Ok(Key::Enter),
                '\t' => Ok(Key::Tab),
                c if c.is_control() => Err(RobotError::InvalidKey(name.to_string())),
                c => Ok(Key::Char(c)),
            };
        }

        let key = match name.to_ascii_lowercase().as_str() {
            "enter" | "return" => Key::Enter,
            "tab" => Key::Tab,
            "space" => Key::Space,
            "backspace" => Key::Backspace,
            "escape" | "esc" => Key::Escape,
            "delete" => Key::Delete,
            "insert" => Key::Insert,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" => Key::PageUp,
            "pagedown" => Key::PageDown,
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "shift" => Key::Shift,
            "control" | "ctrl" => Key::Control,
            "alt" => Key::Alt,
            "command" | "cmd" | "meta" | "super" | "win" => Key::Command,
            "capslock" => Key::CapsLock,
            "printscreen" => Key::PrintScreen,
            "audio_mute" => Key::AudioMute,
            "audio_vol_down" => Key::AudioVolumeDown,
            "audio_vol_up" => Key::AudioVolumeUp,
            "audio_play" => Key::AudioPlay,
            "audio_pause" => Key::AudioPause,
            "audio_next" => Key::AudioNext,
            "audio_prev" => Key::AudioPrev,
            other => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                Some(n @ 1..=12) => Key::F(n),
                _ => return Err(RobotError::InvalidKey(name.to_string())),
            },
        };
        Ok(key)
    }
}

impl FromStr for Key {
    type Err = RobotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::parse(s)
    }
}

/// Modifier keys held down around a key event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Build a modifier set from names such as `["shift", "control"]`.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Modifiers, RobotError> {
        let mut mods = Modifiers::default();
        for name in names {
            match Key::parse(name.as_ref())? {
                Key::Shift => mods.shift = true,
                Key::Control => mods.ctrl = true,
                Key::Alt => mods.alt = true,
                Key::Command => mods.meta = true,
                _ => return Err(RobotError::InvalidKey(name.as_ref().to_string())),
            }
        }
        Ok(mods)
    }

    /// Modifier keys in press order. Release in reverse.
    pub fn keys(&self) -> Vec<Key> {
        let mut keys = Vec::with_capacity(4);
        if self.shift {
            keys.push(Key::Shift);
        }
        if self.ctrl {
            keys.push(Key::Control);
        }
        if self.alt {
            keys.push(Key::Alt);
        }
        if self.meta {
            keys.push(Key::Command);
        }
        keys
    }
}
