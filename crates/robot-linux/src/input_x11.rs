//! X11 input injection using XTest extension.

use std::sync::Arc;

use anyhow::{Context, Result};
use robot_platform::input::{ButtonAction, InputInjector, KeyAction, MouseButton};
use robot_platform::key::{Key, Modifiers};
use xcb::{x, xtest};

use crate::display::X11Display;

/// X11 input injector using XTest
pub struct X11InputInjector {
    display: Arc<X11Display>,
}

// X11 event types for XTest
const MOTION_NOTIFY: u8 = 6;
const BUTTON_PRESS: u8 = 4;
const BUTTON_RELEASE: u8 = 5;
const KEY_PRESS: u8 = 2;
const KEY_RELEASE: u8 = 3;

// X11 button codes
const X11_BUTTON_LEFT: u8 = 1;
const X11_BUTTON_MIDDLE: u8 = 2;
const X11_BUTTON_RIGHT: u8 = 3;
const X11_BUTTON_SCROLL_UP: u8 = 4;
const X11_BUTTON_SCROLL_DOWN: u8 = 5;
const X11_BUTTON_SCROLL_LEFT: u8 = 6;
const X11_BUTTON_SCROLL_RIGHT: u8 = 7;

// Common X11 keycodes (evdev offset = keycode + 8)
const XK_SHIFT_L: u8 = 50;
const XK_CONTROL_L: u8 = 37;
const XK_ALT_L: u8 = 64;
const XK_SUPER_L: u8 = 133;

impl X11InputInjector {
    pub fn new(display: Arc<X11Display>) -> Self {
        Self { display }
    }

    fn fake_input(&self, event_type: u8, detail: u8, x: i16, y: i16) -> Result<()> {
        let conn = self.display.conn();
        let cookie = conn.send_request_checked(&xtest::FakeInput {
            r#type: event_type,
            detail,
            time: x::CURRENT_TIME,
            root: self.display.root(),
            root_x: x,
            root_y: y,
            deviceid: 0,
        });
        conn.check_request(cookie)
            .context("XTest fake_input failed")?;

        conn.flush().context("failed to flush X11 connection")?;
        Ok(())
    }

    fn key_code(&self, keycode: u8, press: bool) -> Result<()> {
        let event_type = if press { KEY_PRESS } else { KEY_RELEASE };
        self.fake_input(event_type, keycode, 0, 0)
    }

    fn apply_modifiers(&self, mods: Modifiers, press: bool) -> Result<()> {
        let mut keys = mods.keys();
        if !press {
            keys.reverse();
        }
        for key in keys {
            self.key_code(named_keycode(key), press)?;
        }
        Ok(())
    }

    fn click_button(&self, btn: u8, times: u32) -> Result<()> {
        for _ in 0..times {
            self.fake_input(BUTTON_PRESS, btn, 0, 0)?;
            self.fake_input(BUTTON_RELEASE, btn, 0, 0)?;
        }
        Ok(())
    }
}

impl InputInjector for X11InputInjector {
    fn mouse_location(&self) -> Result<(i32, i32)> {
        let conn = self.display.conn();
        let cookie = conn.send_request(&x::QueryPointer {
            window: self.display.root(),
        });
        let reply = conn
            .wait_for_reply(cookie)
            .context("QueryPointer failed")?;
        Ok((reply.root_x() as i32, reply.root_y() as i32))
    }

    fn mouse_move(&mut self, x: u32, y: u32) -> Result<()> {
        // MotionNotify with detail=0 is an absolute move to root (x, y)
        let x = i16::try_from(x).context("x coordinate exceeds X11 range")?;
        let y = i16::try_from(y).context("y coordinate exceeds X11 range")?;
        self.fake_input(MOTION_NOTIFY, 0, x, y)
    }

    fn mouse_button(&mut self, btn: MouseButton, action: ButtonAction) -> Result<()> {
        let x11_btn = match btn {
            MouseButton::Left => X11_BUTTON_LEFT,
            MouseButton::Middle => X11_BUTTON_MIDDLE,
            MouseButton::Right => X11_BUTTON_RIGHT,
        };
        let event_type = match action {
            ButtonAction::Press => BUTTON_PRESS,
            ButtonAction::Release => BUTTON_RELEASE,
        };
        self.fake_input(event_type, x11_btn, 0, 0)
    }

    fn mouse_scroll(&mut self, dx: i32, dy: i32) -> Result<()> {
        // X11 scroll is done via button 4/5 (vertical) and 6/7 (horizontal)
        // Each click is one "notch"
        if dy != 0 {
            let btn = if dy < 0 { X11_BUTTON_SCROLL_UP } else { X11_BUTTON_SCROLL_DOWN };
            self.click_button(btn, dy.unsigned_abs())?;
        }
        if dx != 0 {
            let btn = if dx < 0 { X11_BUTTON_SCROLL_LEFT } else { X11_BUTTON_SCROLL_RIGHT };
            self.click_button(btn, dx.unsigned_abs())?;
        }
        Ok(())
    }

    fn key_event(&mut self, key: Key, action: KeyAction, mods: Modifiers) -> Result<bool> {
        let (keycode, shift) = match key {
            Key::Char(ch) => match char_to_keycode(ch) {
                Some(mapped) => mapped,
                None => return Ok(false),
            },
            named => (named_keycode(named), false),
        };
        // Shift is already part of the modifier set, don't press it twice
        let extra_shift = shift && !mods.shift;

        match action {
            KeyAction::Press => {
                self.apply_modifiers(mods, true)?;
                if extra_shift {
                    self.key_code(XK_SHIFT_L, true)?;
                }
                self.key_code(keycode, true)?;
            }
            KeyAction::Release => {
                self.key_code(keycode, false)?;
                if extra_shift {
                    self.key_code(XK_SHIFT_L, false)?;
                }
                self.apply_modifiers(mods, false)?;
            }
        }
        Ok(true)
    }

    fn type_char(&mut self, ch: char) -> Result<bool> {
        // Keycodes are fixed to a US layout, so only ASCII is reachable here.
        let Some((keycode, shift)) = char_to_keycode(ch) else {
            return Ok(false);
        };
        if shift {
            self.key_code(XK_SHIFT_L, true)?;
        }
        self.key_code(keycode, true)?;
        self.key_code(keycode, false)?;
        if shift {
            self.key_code(XK_SHIFT_L, false)?;
        }
        Ok(true)
    }
}

/// Keycodes for non-character keys (evdev + 8).
fn named_keycode(key: Key) -> u8 {
    match key {
        Key::Enter => 36,
        Key::Tab => 23,
        Key::Space => 65,
        Key::Backspace => 22,
        Key::Escape => 9,
        Key::Delete => 119,
        Key::Insert => 118,
        Key::Home => 110,
        Key::End => 115,
        Key::PageUp => 112,
        Key::PageDown => 117,
        Key::Up => 111,
        Key::Down => 116,
        Key::Left => 113,
        Key::Right => 114,
        Key::F(n @ 1..=10) => 66 + n,
        Key::F(11) => 95,
        Key::F(_) => 96,
        Key::Shift => XK_SHIFT_L,
        Key::Control => XK_CONTROL_L,
        Key::Alt => XK_ALT_L,
        Key::Command => XK_SUPER_L,
        Key::CapsLock => 66,
        Key::PrintScreen => 107,
        Key::AudioMute => 121,
        Key::AudioVolumeDown => 122,
        Key::AudioVolumeUp => 123,
        Key::AudioNext => 171,
        Key::AudioPlay => 172,
        Key::AudioPrev => 173,
        Key::AudioPause => 209,
        Key::Char(_) => 0,
    }
}

/// Map ASCII character to X11 keycode + shift flag.
/// Keycodes here are for a standard US keyboard layout (evdev + 8).
fn char_to_keycode(ch: char) -> Option<(u8, bool)> {
    match ch {
        'a'..='z' => Some((qwerty_letter(ch as u8 - b'a'), false)),
        'A'..='Z' => Some((qwerty_letter(ch as u8 - b'A'), true)),
        '0' => Some((19, false)),
        '1'..='9' => Some((ch as u8 - b'1' + 10, false)),
        ' ' => Some((65, false)),
        '\n' | '\r' => Some((36, false)), // Return
        '\t' => Some((23, false)),        // Tab
        '-' => Some((20, false)),
        '=' => Some((21, false)),
        '[' => Some((34, false)),
        ']' => Some((35, false)),
        '\\' => Some((51, false)),
        ';' => Some((47, false)),
        '\'' => Some((48, false)),
        ',' => Some((59, false)),
        '.' => Some((60, false)),
        '/' => Some((61, false)),
        '`' => Some((49, false)),
        // Shifted variants
        '!' => Some((10, true)),
        '@' => Some((11, true)),
        '#' => Some((12, true)),
        '$' => Some((13, true)),
        '%' => Some((14, true)),
        '^' => Some((15, true)),
        '&' => Some((16, true)),
        '*' => Some((17, true)),
        '(' => Some((18, true)),
        ')' => Some((19, true)),
        '_' => Some((20, true)),
        '+' => Some((21, true)),
        '{' => Some((34, true)),
        '}' => Some((35, true)),
        '|' => Some((51, true)),
        ':' => Some((47, true)),
        '"' => Some((48, true)),
        '<' => Some((59, true)),
        '>' => Some((60, true)),
        '?' => Some((61, true)),
        '~' => Some((49, true)),
        _ => None,
    }
}

/// Keycode of the n-th letter of the alphabet on a QWERTY board.
fn qwerty_letter(n: u8) -> u8 {
    const KEYCODES: [u8; 26] = [
        38, 56, 54, 40, 26, 41, 42, 43, 31, 44, 45, 46, 58, // a..m
        57, 32, 33, 24, 27, 39, 28, 30, 55, 25, 53, 29, 52, // n..z
    ];
    KEYCODES[n as usize]
}
