use anyhow::Result;

use crate::color::Color;
use crate::error::RobotError;
use crate::geometry::Rect;

/// Bytes per pixel of every [`Screenshot`] (RGBA).
pub const BYTES_PER_PIXEL: u32 = 4;

/// Raw frame data as read from the display
pub struct ScreenFrame {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Raw BGRA pixel data
    pub data: Vec<u8>,
    /// Stride (bytes per row)
    pub stride: u32,
}

pub trait ScreenCapture: Send {
    /// Current primary display dimensions, queried fresh on every call.
    fn dimensions(&self) -> Result<(u32, u32)>;

    /// Read a region of the primary display. The region is already clipped
    /// to the display by the caller.
    fn capture_region(&mut self, region: Rect) -> Result<ScreenFrame>;
}

/// An immutable RGBA snapshot of a screen region.
///
/// Rows are tightly packed: `image().len() == width * height * 4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    width: u32,
    height: u32,
    image: Vec<u8>,
}

impl Screenshot {
    /// Wrap an existing RGBA buffer, checking its length.
    pub fn new(width: u32, height: u32, image: Vec<u8>) -> Result<Self, RobotError> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL as usize;
        if image.len() != expected {
            return Err(RobotError::InvalidBuffer {
                expected,
                actual: image.len(),
            });
        }
        Ok(Self {
            width,
            height,
            image,
        })
    }

    /// Convert a BGRA backend frame into an RGBA screenshot.
    ///
    /// A frame shorter than `stride * (height - 1) + width * 4` is rejected
    /// as a whole; no partial screenshot is ever produced.
    pub fn from_frame(frame: ScreenFrame) -> Result<Self, RobotError> {
        let row_bytes = frame.width as usize * BYTES_PER_PIXEL as usize;
        let stride = frame.stride as usize;
        let height = frame.height as usize;

        let needed = match height {
            0 => 0,
            h => stride * (h - 1) + row_bytes,
        };
        if stride < row_bytes || frame.data.len() < needed {
            return Err(RobotError::InvalidBuffer {
                expected: needed.max(row_bytes * height),
                actual: frame.data.len(),
            });
        }

        let mut image = Vec::with_capacity(row_bytes * height);
        for row in 0..height {
            let start = row * stride;
            for px in frame.data[start..start + row_bytes].chunks_exact(4) {
                // BGRA -> RGBA
                image.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
            }
        }

        Screenshot::new(frame.width, frame.height, image)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA pixel bytes, row-major, top-left first.
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    pub fn byte_width(&self) -> u32 {
        self.width * BYTES_PER_PIXEL
    }

    pub fn bits_per_pixel(&self) -> u32 {
        BYTES_PER_PIXEL * 8
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        BYTES_PER_PIXEL
    }

    /// Color of the pixel at a local offset inside this screenshot.
    pub fn color_at(&self, x: i64, y: i64) -> Result<Color, RobotError> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return Err(RobotError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }

        let index = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL as usize;
        Ok(Color::new(
            self.image[index],
            self.image[index + 1],
            self.image[index + 2],
        ))
    }
}
