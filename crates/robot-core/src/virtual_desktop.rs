//! In-memory desktop used by the facade tests. Records every synthesized
//! event and renders a deterministic BGRA framebuffer.

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use robot_platform::input::{ButtonAction, InputInjector, KeyAction, MouseButton};
use robot_platform::key::{Key, Modifiers};
use robot_platform::screen::{ScreenCapture, ScreenFrame};
use robot_platform::Rect;

use crate::backend::Backend;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Move(u32, u32),
    Button(MouseButton, ButtonAction),
    Scroll(i32, i32),
    Key(Key, KeyAction, Modifiers),
    Char(char),
}

#[derive(Debug)]
pub struct DesktopState {
    pub width: u32,
    pub height: u32,
    pub cursor: (i32, i32),
    pub events: Vec<Event>,
    pub captures: Vec<Rect>,
    /// Drop the last row of every captured frame
    pub tear_frames: bool,
}

/// Pixel at (x, y): R = x, G = y, B = 0x40 (low bytes).
pub fn expected_rgb(x: u32, y: u32) -> (u8, u8, u8) {
    (x as u8, y as u8, 0x40)
}

#[derive(Clone)]
pub struct VirtualDesktop {
    state: Arc<Mutex<DesktopState>>,
}

impl VirtualDesktop {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(DesktopState {
                width,
                height,
                cursor: (0, 0),
                events: Vec::new(),
                captures: Vec::new(),
                tear_frames: false,
            })),
        }
    }

    pub fn backend(&self) -> Backend {
        Backend {
            input: Box::new(self.clone()),
            screen: Box::new(self.clone()),
            display_name: None,
        }
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, DesktopState> {
        self.state.lock().unwrap()
    }

    pub fn events(&self) -> Vec<Event> {
        self.state().events.clone()
    }

    pub fn typed_text(&self) -> String {
        self.state()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Char(c) => Some(*c),
                _ => None,
            })
            .collect()
    }
}

impl InputInjector for VirtualDesktop {
    fn mouse_location(&self) -> Result<(i32, i32)> {
        Ok(self.state().cursor)
    }

    fn mouse_move(&mut self, x: u32, y: u32) -> Result<()> {
        let mut state = self.state();
        if x >= state.width || y >= state.height {
            bail!("move to ({x}, {y}) outside {}x{}", state.width, state.height);
        }
        state.cursor = (x as i32, y as i32);
        state.events.push(Event::Move(x, y));
        Ok(())
    }

    fn mouse_button(&mut self, btn: MouseButton, action: ButtonAction) -> Result<()> {
        self.state().events.push(Event::Button(btn, action));
        Ok(())
    }

    fn mouse_scroll(&mut self, dx: i32, dy: i32) -> Result<()> {
        self.state().events.push(Event::Scroll(dx, dy));
        Ok(())
    }

    fn key_event(&mut self, key: Key, action: KeyAction, mods: Modifiers) -> Result<bool> {
        if matches!(key, Key::Char(ch) if !ch.is_ascii()) {
            return Ok(false);
        }
        self.state().events.push(Event::Key(key, action, mods));
        Ok(true)
    }

    fn type_char(&mut self, ch: char) -> Result<bool> {
        // Behaves like a US-layout keyboard: ASCII only
        if !ch.is_ascii() {
            return Ok(false);
        }
        self.state().events.push(Event::Char(ch));
        Ok(true)
    }
}

impl ScreenCapture for VirtualDesktop {
    fn dimensions(&self) -> Result<(u32, u32)> {
        let state = self.state();
        Ok((state.width, state.height))
    }

    fn capture_region(&mut self, region: Rect) -> Result<ScreenFrame> {
        let mut state = self.state();
        state.captures.push(region);

        let stride = region.width * 4;
        let mut data = Vec::with_capacity((stride * region.height) as usize);
        for y in region.y as u32..region.y as u32 + region.height {
            for x in region.x as u32..region.x as u32 + region.width {
                let (r, g, b) = expected_rgb(x, y);
                data.extend_from_slice(&[b, g, r, 0xFF]);
            }
        }
        if state.tear_frames {
            data.truncate(data.len() - stride as usize);
        }

        Ok(ScreenFrame {
            width: region.width,
            height: region.height,
            data,
            stride,
        })
    }
}
