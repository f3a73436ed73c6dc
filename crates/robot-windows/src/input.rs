//! Windows input injection using SendInput API.

use anyhow::{Context, Result};
use robot_platform::input::{ButtonAction, InputInjector, KeyAction, MouseButton};
use robot_platform::key::{Key, Modifiers};
use tracing::debug;
use windows::Win32::Foundation::POINT;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, VkKeyScanW, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT,
    KEYBD_EVENT_FLAGS, KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, KEYEVENTF_UNICODE,
    MOUSEEVENTF_HWHEEL, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MIDDLEDOWN,
    MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP, MOUSEEVENTF_WHEEL,
    MOUSEINPUT, MOUSE_EVENT_FLAGS, VIRTUAL_KEY, VK_BACK, VK_CAPITAL, VK_DELETE, VK_DOWN,
    VK_END, VK_ESCAPE, VK_F1, VK_HOME, VK_INSERT, VK_LCONTROL, VK_LEFT, VK_LMENU, VK_LSHIFT,
    VK_LWIN, VK_MEDIA_NEXT_TRACK, VK_MEDIA_PLAY_PAUSE, VK_MEDIA_PREV_TRACK, VK_MEDIA_STOP,
    VK_NEXT, VK_PRIOR, VK_RETURN, VK_RIGHT, VK_SNAPSHOT, VK_SPACE, VK_TAB, VK_UP,
    VK_VOLUME_DOWN, VK_VOLUME_MUTE, VK_VOLUME_UP,
};
use windows::Win32::UI::WindowsAndMessaging::{GetCursorPos, SetCursorPos};

/// One notch of the mouse wheel
const WHEEL_DELTA: i32 = 120;

/// Windows input injector using SendInput API
pub struct WindowsInputInjector;

impl WindowsInputInjector {
    pub fn new() -> Self {
        Self
    }

    fn send_inputs(&self, inputs: &[INPUT]) -> Result<()> {
        let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
        if sent as usize != inputs.len() {
            anyhow::bail!(
                "SendInput: sent {} of {} inputs",
                sent,
                inputs.len()
            );
        }
        Ok(())
    }

    fn send_mouse(&self, flags: MOUSE_EVENT_FLAGS, data: i32) -> Result<()> {
        let input = INPUT {
            r#type: INPUT_MOUSE,
            Anonymous: INPUT_0 {
                mi: MOUSEINPUT {
                    dx: 0,
                    dy: 0,
                    mouseData: data as _,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        };
        self.send_inputs(&[input])
    }
}

impl Default for WindowsInputInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl InputInjector for WindowsInputInjector {
    fn mouse_location(&self) -> Result<(i32, i32)> {
        let mut point = POINT { x: 0, y: 0 };
        unsafe { GetCursorPos(&mut point) }.context("GetCursorPos failed")?;
        Ok((point.x, point.y))
    }

    fn mouse_move(&mut self, x: u32, y: u32) -> Result<()> {
        // SetCursorPos is pixel-exact; normalized SendInput coordinates
        // round and can land one pixel off.
        unsafe { SetCursorPos(x as i32, y as i32) }.context("SetCursorPos failed")?;
        Ok(())
    }

    fn mouse_button(&mut self, btn: MouseButton, action: ButtonAction) -> Result<()> {
        let flags = match (btn, action) {
            (MouseButton::Left, ButtonAction::Press) => MOUSEEVENTF_LEFTDOWN,
            (MouseButton::Left, ButtonAction::Release) => MOUSEEVENTF_LEFTUP,
            (MouseButton::Right, ButtonAction::Press) => MOUSEEVENTF_RIGHTDOWN,
            (MouseButton::Right, ButtonAction::Release) => MOUSEEVENTF_RIGHTUP,
            (MouseButton::Middle, ButtonAction::Press) => MOUSEEVENTF_MIDDLEDOWN,
            (MouseButton::Middle, ButtonAction::Release) => MOUSEEVENTF_MIDDLEUP,
        };
        self.send_mouse(flags, 0)
    }

    fn mouse_scroll(&mut self, dx: i32, dy: i32) -> Result<()> {
        // Positive wheel data scrolls away from the user (up)
        if dy != 0 {
            self.send_mouse(MOUSEEVENTF_WHEEL, wheel_data(dy).saturating_neg())?;
        }
        if dx != 0 {
            self.send_mouse(MOUSEEVENTF_HWHEEL, wheel_data(dx))?;
        }
        Ok(())
    }

    fn key_event(&mut self, key: Key, action: KeyAction, mods: Modifiers) -> Result<bool> {
        let (vk, shift) = match key {
            Key::Char(ch) => match char_to_vk(ch) {
                Some(mapped) => mapped,
                None => return Ok(false),
            },
            named => (named_vk(named), false),
        };
        let extra_shift = shift && !mods.shift;

        let mut inputs = Vec::new();
        match action {
            KeyAction::Press => {
                for m in mods.keys() {
                    inputs.push(vk_input(named_vk(m), false));
                }
                if extra_shift {
                    inputs.push(vk_input(VK_LSHIFT, false));
                }
                inputs.push(vk_input(vk, false));
            }
            KeyAction::Release => {
                inputs.push(vk_input(vk, true));
                if extra_shift {
                    inputs.push(vk_input(VK_LSHIFT, true));
                }
                for m in mods.keys().into_iter().rev() {
                    inputs.push(vk_input(named_vk(m), true));
                }
            }
        }
        self.send_inputs(&inputs)?;
        Ok(true)
    }

    fn type_char(&mut self, ch: char) -> Result<bool> {
        if let Some((vk, shift)) = char_to_vk(ch) {
            let mut inputs = Vec::with_capacity(4);
            if shift {
                inputs.push(vk_input(VK_LSHIFT, false));
            }
            inputs.push(vk_input(vk, false));
            inputs.push(vk_input(vk, true));
            if shift {
                inputs.push(vk_input(VK_LSHIFT, true));
            }
            self.send_inputs(&inputs)?;
            return Ok(true);
        }

        // Not on the active layout
        let mut units = [0u16; 2];
        let inputs: Vec<INPUT> = ch
            .encode_utf16(&mut units)
            .iter()
            .flat_map(|&unit| [unicode_input(unit, false), unicode_input(unit, true)])
            .collect();
        debug!("typing {:?} as {} unicode events", ch, inputs.len());
        self.send_inputs(&inputs)?;
        Ok(true)
    }
}

/// Wheel data for a notch count, saturating at the `i32` range.
fn wheel_data(notches: i32) -> i32 {
    notches.saturating_mul(WHEEL_DELTA)
}

fn vk_input(vk: VIRTUAL_KEY, key_up: bool) -> INPUT {
    let mut flags = KEYBD_EVENT_FLAGS(0);
    if is_extended(vk) {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }
    if key_up {
        flags |= KEYEVENTF_KEYUP;
    }
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: vk,
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn unicode_input(unit: u16, key_up: bool) -> INPUT {
    let flags = if key_up {
        KEYEVENTF_UNICODE | KEYEVENTF_KEYUP
    } else {
        KEYEVENTF_UNICODE
    };
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(0),
                wScan: unit,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

/// Navigation keys live on the extended part of the keyboard.
fn is_extended(vk: VIRTUAL_KEY) -> bool {
    [
        VK_INSERT, VK_DELETE, VK_HOME, VK_END, VK_PRIOR, VK_NEXT, VK_UP, VK_DOWN, VK_LEFT,
        VK_RIGHT, VK_LWIN,
    ]
    .contains(&vk)
}

/// Virtual key for a character in the active layout, plus whether Shift is needed.
fn char_to_vk(ch: char) -> Option<(VIRTUAL_KEY, bool)> {
    let mut units = [0u16; 2];
    let encoded = ch.encode_utf16(&mut units);
    if encoded.len() != 1 {
        return None;
    }
    let scan = unsafe { VkKeyScanW(encoded[0]) };
    if scan == -1 {
        return None;
    }
    let vk = (scan as u16) & 0xFF;
    let shift_state = ((scan as u16) >> 8) & 0xFF;
    // Only plain and Shift-ed characters; Ctrl/Alt combinations are layout dead ends
    if shift_state & !0x01 != 0 {
        return None;
    }
    Some((VIRTUAL_KEY(vk), shift_state & 0x01 != 0))
}

fn named_vk(key: Key) -> VIRTUAL_KEY {
    match key {
        Key::Enter => VK_RETURN,
        Key::Tab => VK_TAB,
        Key::Space => VK_SPACE,
        Key::Backspace => VK_BACK,
        Key::Escape => VK_ESCAPE,
        Key::Delete => VK_DELETE,
        Key::Insert => VK_INSERT,
        Key::Home => VK_HOME,
        Key::End => VK_END,
        Key::PageUp => VK_PRIOR,
        Key::PageDown => VK_NEXT,
        Key::Up => VK_UP,
        Key::Down => VK_DOWN,
        Key::Left => VK_LEFT,
        Key::Right => VK_RIGHT,
        Key::F(n) => VIRTUAL_KEY(VK_F1.0 + n.saturating_sub(1) as u16),
        Key::Shift => VK_LSHIFT,
        Key::Control => VK_LCONTROL,
        Key::Alt => VK_LMENU,
        Key::Command => VK_LWIN,
        Key::CapsLock => VK_CAPITAL,
        Key::PrintScreen => VK_SNAPSHOT,
        Key::AudioMute => VK_VOLUME_MUTE,
        Key::AudioVolumeDown => VK_VOLUME_DOWN,
        Key::AudioVolumeUp => VK_VOLUME_UP,
        Key::AudioPlay => VK_MEDIA_PLAY_PAUSE,
        Key::AudioPause => VK_MEDIA_STOP,
        Key::AudioNext => VK_MEDIA_NEXT_TRACK,
        Key::AudioPrev => VK_MEDIA_PREV_TRACK,
        Key::Char(_) => VIRTUAL_KEY(0),
    }
}

/// Factory function for creating input injector on Windows
pub fn create_input_injector() -> Box<dyn InputInjector> {
    tracing::info!("using SendInput for Windows input injection");
    Box::new(WindowsInputInjector::new())
}
