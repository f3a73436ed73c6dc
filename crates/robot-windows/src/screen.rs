//! Windows screen capture using GDI `BitBlt` of the requested region.

use anyhow::{bail, Context, Result};
use robot_platform::screen::{ScreenCapture, ScreenFrame};
use robot_platform::Rect;
use tracing::debug;
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, GetDC,
    GetDIBits, ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS,
    HDC, SRCCOPY,
};
use windows::Win32::UI::WindowsAndMessaging::{GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN};

/// GDI screen capture of the primary display
pub struct GdiScreenCapture;

impl GdiScreenCapture {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GdiScreenCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenCapture for GdiScreenCapture {
    fn dimensions(&self) -> Result<(u32, u32)> {
        let width = unsafe { GetSystemMetrics(SM_CXSCREEN) };
        let height = unsafe { GetSystemMetrics(SM_CYSCREEN) };
        if width <= 0 || height <= 0 {
            bail!("GetSystemMetrics returned invalid screen size: {width}x{height}");
        }
        Ok((width as u32, height as u32))
    }

    fn capture_region(&mut self, region: Rect) -> Result<ScreenFrame> {
        unsafe {
            let screen_dc = GetDC(HWND(std::ptr::null_mut()));
            if screen_dc.is_invalid() {
                bail!("GetDC(NULL) failed");
            }
            let result = blit_region(screen_dc, region);
            ReleaseDC(HWND(std::ptr::null_mut()), screen_dc);
            result
        }
    }
}

/// Copy `region` of the screen DC into a top-down 32-bit DIB.
unsafe fn blit_region(screen_dc: HDC, region: Rect) -> Result<ScreenFrame> {
    let (width, height) = (region.width, region.height);

    let mem_dc = CreateCompatibleDC(screen_dc);
    if mem_dc.is_invalid() {
        bail!("CreateCompatibleDC failed");
    }
    let bitmap = CreateCompatibleBitmap(screen_dc, width as i32, height as i32);
    if bitmap.is_invalid() {
        let _ = DeleteDC(mem_dc);
        bail!("CreateCompatibleBitmap failed");
    }
    let old_bitmap = SelectObject(mem_dc, bitmap);

    let blit = BitBlt(
        mem_dc,
        0,
        0,
        width as i32,
        height as i32,
        screen_dc,
        region.x,
        region.y,
        SRCCOPY,
    )
    .context("BitBlt failed");

    let mut pixels = vec![0u8; width as usize * height as usize * 4];
    let lines = if blit.is_ok() {
        let mut bmi = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width as i32,
                // Negative height = top-down bitmap (row 0 at top).
                biHeight: -(height as i32),
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                biSizeImage: 0,
                biXPelsPerMeter: 0,
                biYPelsPerMeter: 0,
                biClrUsed: 0,
                biClrImportant: 0,
            },
            bmiColors: [Default::default()],
        };
        GetDIBits(
            mem_dc,
            bitmap,
            0,
            height,
            Some(pixels.as_mut_ptr() as *mut _),
            &mut bmi,
            DIB_RGB_COLORS,
        )
    } else {
        0
    };

    SelectObject(mem_dc, old_bitmap);
    let _ = DeleteObject(bitmap);
    let _ = DeleteDC(mem_dc);

    blit?;
    if lines as u32 != height {
        bail!("GetDIBits copied {lines} of {height} lines");
    }

    // GDI BI_RGB 32-bit leaves alpha at 0; the screen is opaque.
    for px in pixels.chunks_exact_mut(4) {
        px[3] = 0xFF;
    }

    debug!(
        "GDI captured {}x{} at ({}, {})",
        width, height, region.x, region.y
    );

    Ok(ScreenFrame {
        width,
        height,
        data: pixels,
        stride: width * 4,
    })
}

/// Factory function for creating screen capture on Windows
pub fn create_screen_capture() -> Box<dyn ScreenCapture> {
    tracing::info!("using GDI BitBlt for screen capture");
    Box::new(GdiScreenCapture::new())
}
