use thiserror::Error;

/// Errors surfaced by the automation facade.
///
/// Backends report OS failures as `anyhow::Error` with context attached;
/// those end up in [`RobotError::Backend`]. Everything else is a condition
/// the caller can match on.
#[derive(Debug, Error)]
pub enum RobotError {
    #[error("invalid key name: {0:?}")]
    InvalidKey(String),

    #[error("invalid mouse button: {0:?} (expected left, right or middle)")]
    InvalidButton(String),

    #[error("invalid color: {0:?} (expected #RRGGBB)")]
    InvalidColor(String),

    #[error("coordinates ({x}, {y}) out of bounds for {width}x{height}")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    #[error("display unavailable: {0}")]
    DisplayUnavailable(String),

    #[error("{operation} is not supported on {platform}")]
    UnsupportedPlatform {
        operation: &'static str,
        platform: &'static str,
    },

    #[error("typed {typed} characters, skipped {} untypable: {skipped:?}", .skipped.len())]
    UntypableCharacters { skipped: Vec<char>, typed: usize },

    #[error("pixel buffer has {actual} bytes, expected {expected}")]
    InvalidBuffer { expected: usize, actual: usize },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl RobotError {
    /// Shorthand for an operation missing on the running OS.
    pub fn unsupported(operation: &'static str) -> Self {
        RobotError::UnsupportedPlatform {
            operation,
            platform: std::env::consts::OS,
        }
    }
}

pub type Result<T> = std::result::Result<T, RobotError>;
