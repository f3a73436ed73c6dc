// Shared types and capability traits implemented by each platform backend.

pub mod color;
pub mod error;
pub mod geometry;
pub mod input;
pub mod key;
pub mod screen;

pub use color::Color;
pub use error::{Result, RobotError};
pub use geometry::{Point, Rect, ScreenSize};
pub use screen::Screenshot;
