// Linux platform implementations (X11 via xcb)

#[cfg(target_os = "linux")]
pub mod display;

#[cfg(target_os = "linux")]
pub mod screen_x11;
#[cfg(target_os = "linux")]
pub mod screen;

#[cfg(target_os = "linux")]
pub mod input_x11;
#[cfg(target_os = "linux")]
pub mod input;

// pub mod input_wayland;  // Wayland-native injection needs a compositor protocol; XWayland covers it for now
