use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use robot_core::config::RobotConfig;
use robot_core::export;
use robot_core::{ButtonAction, KeyAction, MouseButton, Point, Robot, ScreenSize};

#[derive(Parser, Debug)]
#[command(name = "robotctl")]
#[command(about = "Drive the mouse and keyboard and read the screen")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(long = "config", env = "ROBOT_CONFIG_PATH", global = true)]
    config_path: Option<PathBuf>,

    /// X11 display to use instead of $DISPLAY (Linux only)
    #[arg(long, env = "ROBOT_DISPLAY", global = true)]
    display: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "ROBOT_LOG_LEVEL", global = true)]
    log_level: String,

    /// Pause after each mouse action, in milliseconds
    #[arg(long, global = true, allow_negative_numbers = true)]
    mouse_delay: Option<i64>,

    /// Pause after each keystroke, in milliseconds
    #[arg(long, global = true, allow_negative_numbers = true)]
    keyboard_delay: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the cursor position
    MousePos,
    /// Warp the cursor (clamped to the screen)
    Move {
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        y: i32,
    },
    /// Glide the cursor in a straight line
    MoveSmooth {
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        y: i32,
        /// Pixels per step
        #[arg(long)]
        speed: Option<f64>,
    },
    /// Hold a button while moving to a point
    Drag {
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        y: i32,
        #[arg(long, default_value = "left")]
        button: MouseButton,
    },
    /// Click at the cursor position
    Click {
        #[arg(default_value = "left")]
        button: MouseButton,
        #[arg(long)]
        double: bool,
    },
    /// Press ("down") or release ("up") a mouse button
    ToggleButton {
        action: ButtonAction,
        #[arg(default_value = "left")]
        button: MouseButton,
    },
    /// Scroll by wheel notches; positive dy scrolls down
    Scroll {
        #[arg(allow_negative_numbers = true)]
        dx: i32,
        #[arg(allow_negative_numbers = true)]
        dy: i32,
    },
    /// Print the primary display size
    ScreenSize,
    /// Print the color of one screen pixel
    PixelColor {
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        y: i32,
    },
    /// Type text
    Type {
        text: String,
        /// Characters per minute (default: keyboard delay per character)
        #[arg(long)]
        cpm: Option<u32>,
    },
    /// Tap a key, optionally with modifiers
    KeyTap {
        key: String,
        /// Modifier names: shift, control, alt, command
        #[arg(short, long = "modifier")]
        modifiers: Vec<String>,
    },
    /// Press ("down") or release ("up") a key
    KeyToggle {
        key: String,
        action: KeyAction,
        #[arg(short, long = "modifier")]
        modifiers: Vec<String>,
    },
    /// Capture the screen or a region
    Capture {
        #[arg(long, allow_negative_numbers = true)]
        x: Option<i32>,
        #[arg(long, allow_negative_numbers = true)]
        y: Option<i32>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// Write the capture as PNG
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct PixelOutput {
    x: i32,
    y: i32,
    color: String,
}

#[derive(Serialize)]
struct CaptureOutput {
    width: u32,
    height: u32,
    byte_width: u32,
    bits_per_pixel: u32,
    bytes_per_pixel: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    debug!(
        "robotctl v{} (os={}, arch={})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH,
    );

    let config = load_config(&cli)?;
    let mut robot = Robot::with_config(config).context("failed to open the desktop")?;

    // CLI args override config file
    if let Some(ms) = cli.mouse_delay {
        robot.set_mouse_delay(ms);
    }
    if let Some(ms) = cli.keyboard_delay {
        robot.set_keyboard_delay(ms);
    }

    run(&mut robot, cli.command)
}

fn load_config(cli: &Cli) -> Result<RobotConfig> {
    let config_path = cli
        .config_path
        .clone()
        .unwrap_or_else(RobotConfig::default_path);

    let mut config = RobotConfig::load_or_default(&config_path)?;
    if let Some(display) = &cli.display {
        config.x_display_name = Some(display.clone());
    }
    Ok(config)
}

fn run(robot: &mut Robot, command: Commands) -> Result<()> {
    match command {
        Commands::MousePos => print_json(&robot.get_mouse_pos()?),
        Commands::Move { x, y } => {
            robot.move_mouse(x, y)?;
            print_json(&robot.get_mouse_pos()?)
        }
        Commands::MoveSmooth { x, y, speed } => {
            robot.move_mouse_smooth(x, y, speed)?;
            print_json(&robot.get_mouse_pos()?)
        }
        Commands::Drag { x, y, button } => {
            robot.drag_mouse(x, y, button)?;
            print_json(&robot.get_mouse_pos()?)
        }
        Commands::Click { button, double } => Ok(robot.mouse_click(button, double)?),
        Commands::ToggleButton { action, button } => Ok(robot.mouse_toggle(action, button)?),
        Commands::Scroll { dx, dy } => Ok(robot.scroll_mouse(dx, dy)?),
        Commands::ScreenSize => print_json::<ScreenSize>(&robot.get_screen_size()?),
        Commands::PixelColor { x, y } => {
            let color = robot.get_pixel_color(x, y)?;
            print_json(&PixelOutput {
                x,
                y,
                color: color.to_hex(),
            })
        }
        Commands::Type { text, cpm } => {
            match cpm {
                Some(cpm) => robot.type_string_delayed(&text, cpm)?,
                None => robot.type_string(&text)?,
            }
            Ok(())
        }
        Commands::KeyTap { key, modifiers } => Ok(robot.key_tap(&key, modifiers.as_slice())?),
        Commands::KeyToggle {
            key,
            action,
            modifiers,
        } => Ok(robot.key_toggle(&key, action, modifiers.as_slice())?),
        Commands::Capture {
            x,
            y,
            width,
            height,
            out,
        } => {
            let shot = robot.capture_screen_area(x, y, width, height)?;
            if let Some(path) = &out {
                export::save_png(&shot, path)?;
            }
            info!("captured {}x{}", shot.width(), shot.height());
            print_json(&CaptureOutput {
                width: shot.width(),
                height: shot.height(),
                byte_width: shot.byte_width(),
                bits_per_pixel: shot.bits_per_pixel(),
                bytes_per_pixel: shot.bytes_per_pixel(),
                path: out,
            })
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
