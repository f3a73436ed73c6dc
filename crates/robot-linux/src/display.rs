//! Shared X11 connection used by both the input injector and screen capture.

use std::sync::Arc;

use robot_platform::RobotError;
use xcb::x;

/// An open connection to an X server, with the XTest extension verified.
pub struct X11Display {
    conn: xcb::Connection,
    root: x::Window,
    screen_num: i32,
    bits_per_pixel: u8,
    name: Option<String>,
}

impl X11Display {
    pub fn conn(&self) -> &xcb::Connection {
        &self.conn
    }

    pub fn root(&self) -> x::Window {
        self.root
    }

    /// Bits per pixel of ZPixmap images at the root window's depth.
    pub fn bits_per_pixel(&self) -> u8 {
        self.bits_per_pixel
    }

    /// Display name the connection was opened with (`$DISPLAY` if none was given).
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Open the X display `display`, or `$DISPLAY` when `None`.
pub fn open(display: Option<&str>) -> Result<Arc<X11Display>, RobotError> {
    let name = display
        .map(str::to_string)
        .or_else(|| std::env::var("DISPLAY").ok().filter(|d| !d.is_empty()));

    let Some(name) = name else {
        if std::env::var("WAYLAND_DISPLAY").is_ok() {
            return Err(RobotError::DisplayUnavailable(
                "Wayland session without XWayland (DISPLAY is not set)".into(),
            ));
        }
        return Err(RobotError::DisplayUnavailable(
            "no display server detected, set DISPLAY".into(),
        ));
    };

    let (conn, screen_num) =
        xcb::Connection::connect_with_extensions(Some(name.as_str()), &[xcb::Extension::Test], &[])
            .map_err(|e| {
                RobotError::DisplayUnavailable(format!("cannot open X display {name}: {e}"))
            })?;

    let setup = conn.get_setup();
    let screen = setup.roots().nth(screen_num as usize).ok_or_else(|| {
        RobotError::DisplayUnavailable(format!("no X11 screen {screen_num} on {name}"))
    })?;

    let root = screen.root();
    let depth = screen.root_depth();
    let bits_per_pixel = setup
        .pixmap_formats()
        .iter()
        .find(|f| f.depth() == depth)
        .map(|f| f.bits_per_pixel())
        .unwrap_or(0);

    tracing::info!(
        "connected to X display {} (screen {}, depth {}, {} bpp)",
        name,
        screen_num,
        depth,
        bits_per_pixel
    );

    Ok(Arc::new(X11Display {
        conn,
        root,
        screen_num,
        bits_per_pixel,
        name: Some(name),
    }))
}

impl std::fmt::Debug for X11Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X11Display")
            .field("name", &self.name)
            .field("screen_num", &self.screen_num)
            .field("bits_per_pixel", &self.bits_per_pixel)
            .finish()
    }
}
