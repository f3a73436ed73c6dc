//! Screen capture construction for Linux.

use std::sync::Arc;

use robot_platform::screen::ScreenCapture;

use crate::display::X11Display;

pub use crate::screen_x11::X11ScreenCapture;

/// Return the ScreenCapture implementation for an open X display.
pub fn create_screen_capture(display: Arc<X11Display>) -> Box<dyn ScreenCapture> {
    let name = display.name().unwrap_or("default display");
    tracing::info!("using xcb GetImage screen capture on {}", name);
    Box::new(X11ScreenCapture::new(display))
}
