//! X11 screen capture using core-protocol GetImage on the root window.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use robot_platform::screen::{ScreenCapture, ScreenFrame};
use robot_platform::Rect;
use xcb::x;

use crate::display::X11Display;

/// X11 screen capture via xcb
pub struct X11ScreenCapture {
    display: Arc<X11Display>,
}

impl X11ScreenCapture {
    pub fn new(display: Arc<X11Display>) -> Self {
        Self { display }
    }
}

impl ScreenCapture for X11ScreenCapture {
    fn dimensions(&self) -> Result<(u32, u32)> {
        // The setup block is frozen at connect time; the root geometry
        // follows RandR resizes.
        let conn = self.display.conn();
        let cookie = conn.send_request(&x::GetGeometry {
            drawable: x::Drawable::Window(self.display.root()),
        });
        let reply = conn
            .wait_for_reply(cookie)
            .context("GetGeometry on root window failed")?;
        Ok((reply.width() as u32, reply.height() as u32))
    }

    fn capture_region(&mut self, region: Rect) -> Result<ScreenFrame> {
        if self.display.bits_per_pixel() != 32 {
            bail!(
                "unsupported X11 pixel format: {} bits per pixel (need 32)",
                self.display.bits_per_pixel()
            );
        }

        let width = u16::try_from(region.width).context("capture width exceeds X11 range")?;
        let height = u16::try_from(region.height).context("capture height exceeds X11 range")?;
        let x = i16::try_from(region.x).context("capture x exceeds X11 range")?;
        let y = i16::try_from(region.y).context("capture y exceeds X11 range")?;

        let conn = self.display.conn();
        let cookie = conn.send_request(&x::GetImage {
            format: x::ImageFormat::ZPixmap,
            drawable: x::Drawable::Window(self.display.root()),
            x,
            y,
            width,
            height,
            plane_mask: u32::MAX, // all planes
        });
        let reply = conn
            .wait_for_reply(cookie)
            .context("xcb GetImage failed")?;

        let stride = region.width * 4;
        let expected = (stride * region.height) as usize;
        let mut data = reply.data().to_vec();
        if data.len() < expected {
            bail!(
                "GetImage returned {} bytes for a {}x{} region (expected {})",
                data.len(),
                region.width,
                region.height,
                expected
            );
        }
        data.truncate(expected);

        // Depth 24 leaves the padding byte undefined; the frame is opaque.
        if reply.depth() != 32 {
            for px in data.chunks_exact_mut(4) {
                px[3] = 0xFF;
            }
        }

        tracing::debug!(
            "captured {}x{} at ({}, {}), depth {}",
            region.width,
            region.height,
            region.x,
            region.y,
            reply.depth()
        );

        // ZPixmap at 32 bpp on a little-endian server is BGRA
        Ok(ScreenFrame {
            width: region.width,
            height: region.height,
            data,
            stride,
        })
    }
}
