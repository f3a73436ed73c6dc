use serde::{Deserialize, Serialize};

/// Absolute screen coordinates, origin at the top-left of the primary display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Primary display dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    /// Clamp a point onto the display, i.e. into `[0, width-1] x [0, height-1]`.
    pub fn clamp(&self, x: i32, y: i32) -> Point {
        let max_x = self.width.saturating_sub(1).min(i32::MAX as u32) as i32;
        let max_y = self.height.saturating_sub(1).min(i32::MAX as u32) as i32;
        Point {
            x: x.clamp(0, max_x),
            y: y.clamp(0, max_y),
        }
    }
}

/// A rectangular screen region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Intersect with the display. Returns `None` when nothing is left.
    pub fn clip_to(&self, screen: ScreenSize) -> Option<Rect> {
        let left = (self.x as i64).max(0);
        let top = (self.y as i64).max(0);
        let right = (self.x as i64 + self.width as i64).min(screen.width as i64);
        let bottom = (self.y as i64 + self.height as i64).min(screen.height as i64);

        if right <= left || bottom <= top {
            return None;
        }

        Some(Rect {
            x: left as i32,
            y: top as i32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }
}
