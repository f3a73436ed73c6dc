//! Input injection construction for Linux.
//! Currently X11 only (XTest). Wayland sessions are driven through XWayland.

use std::sync::Arc;

use robot_platform::input::InputInjector;

use crate::display::X11Display;

pub use crate::input_x11::X11InputInjector;

/// Return the InputInjector implementation for an open X display.
pub fn create_input_injector(display: Arc<X11Display>) -> Box<dyn InputInjector> {
    tracing::info!("using X11 input injection (XTest)");
    Box::new(X11InputInjector::new(display))
}
