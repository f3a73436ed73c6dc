//! Desktop automation: synthesize mouse and keyboard input, read the
//! screen. See [`Robot`].

pub mod backend;
pub mod config;
pub mod export;
pub mod robot;

#[cfg(test)]
mod virtual_desktop;

pub use config::RobotConfig;
pub use robot::Robot;

pub use robot_platform::input::{ButtonAction, KeyAction, MouseButton};
pub use robot_platform::key::{Key, Modifiers};
pub use robot_platform::{Color, Point, Rect, Result, RobotError, ScreenSize, Screenshot};
