use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Pause after every synthetic mouse action, in milliseconds
    #[serde(default = "default_mouse_delay")]
    pub mouse_delay_ms: u64,

    /// Pause after every synthetic keystroke, in milliseconds
    #[serde(default = "default_keyboard_delay")]
    pub keyboard_delay_ms: u64,

    /// Gap between the two clicks of a double click, in milliseconds
    #[serde(default = "default_double_click_interval")]
    pub double_click_interval_ms: u64,

    /// Pixels per step for smooth mouse movement
    #[serde(default = "default_smooth_move_speed")]
    pub smooth_move_speed: f64,

    /// X11 display to connect to instead of $DISPLAY
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_display_name: Option<String>,
}

fn default_mouse_delay() -> u64 {
    10
}
fn default_keyboard_delay() -> u64 {
    10
}
fn default_double_click_interval() -> u64 {
    10
}
fn default_smooth_move_speed() -> f64 {
    3.0
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            mouse_delay_ms: default_mouse_delay(),
            keyboard_delay_ms: default_keyboard_delay(),
            double_click_interval_ms: default_double_click_interval(),
            smooth_move_speed: default_smooth_move_speed(),
            x_display_name: None,
        }
    }
}

impl RobotConfig {
    /// Default config file path for this platform
    pub fn default_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "robot", "robotctl") {
            dirs.config_dir().join("config.json")
        } else {
            PathBuf::from("robot-config.json")
        }
    }

    /// Load config from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        let config: Self =
            serde_json::from_str(&data).with_context(|| "failed to parse config JSON")?;
        Ok(config)
    }

    /// Load from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::info!("loading config from {}", path.display());
            Self::load(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to a file path
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config dir {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Smooth-move speed, falling back to the default for non-positive values.
    pub fn effective_smooth_speed(&self) -> f64 {
        if self.smooth_move_speed.is_finite() && self.smooth_move_speed > 0.0 {
            self.smooth_move_speed
        } else {
            default_smooth_move_speed()
        }
    }
}
