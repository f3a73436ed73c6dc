//! Platform backend selection.

use robot_platform::input::InputInjector;
use robot_platform::screen::ScreenCapture;
use robot_platform::Result;

/// Input injector and screen capture for one platform.
pub struct Backend {
    pub input: Box<dyn InputInjector>,
    pub screen: Box<dyn ScreenCapture>,
    /// X11 display name when the backend talks to an X server
    pub display_name: Option<String>,
}

/// Whether the current platform's backend connects to a named X display.
pub fn supports_x_display() -> bool {
    cfg!(target_os = "linux")
}

/// Build the backend for the running OS.
///
/// `display` picks an X11 display on Linux and is ignored elsewhere.
#[cfg(target_os = "linux")]
pub fn create_backend(display: Option<&str>) -> Result<Backend> {
    let x11 = robot_linux::display::open(display)?;
    let display_name = x11.name().map(str::to_string);
    Ok(Backend {
        input: robot_linux::input::create_input_injector(x11.clone()),
        screen: robot_linux::screen::create_screen_capture(x11),
        display_name,
    })
}

#[cfg(target_os = "windows")]
pub fn create_backend(display: Option<&str>) -> Result<Backend> {
    if let Some(name) = display {
        tracing::warn!("ignoring X display {:?} on Windows", name);
    }
    robot_windows::session::ensure_interactive()?;
    Ok(Backend {
        input: robot_windows::input::create_input_injector(),
        screen: robot_windows::screen::create_screen_capture(),
        display_name: None,
    })
}

#[cfg(target_os = "macos")]
pub fn create_backend(_display: Option<&str>) -> Result<Backend> {
    Err(robot_platform::RobotError::UnsupportedPlatform {
        operation: "desktop automation",
        platform: "macos",
    })
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub fn create_backend(_display: Option<&str>) -> Result<Backend> {
    Err(robot_platform::RobotError::unsupported("desktop automation"))
}
