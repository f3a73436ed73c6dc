// Windows platform implementations

#[cfg(target_os = "windows")]
pub mod session;

#[cfg(target_os = "windows")]
pub mod screen;

#[cfg(target_os = "windows")]
pub mod input;
