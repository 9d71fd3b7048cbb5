use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum GameError {
    OutOfBounds {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    },
    LevelNotFound {
        index: usize,
    },
    LevelUnreadable {
        path: PathBuf,
        reason: String,
    },
    InvalidLevel {
        reason: String,
    },
    MissingSpawn {
        level: usize,
    },
    Config {
        reason: String,
    },
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl GameError {
    /// Level load failures end a session; everything else is a bug or an
    /// environment problem.
    pub fn is_level_load_failure(&self) -> bool {
        matches!(
            self,
            Self::LevelNotFound { .. } | Self::LevelUnreadable { .. } | Self::InvalidLevel { .. }
        )
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds {
                x,
                y,
                width,
                height,
            } => write!(f, "tile ({x}, {y}) is outside the {width}x{height} grid"),
            Self::LevelNotFound { index } => write!(f, "no level configured at index {index}"),
            Self::LevelUnreadable { path, reason } => {
                write!(f, "cannot read level {}: {reason}", path.display())
            }
            Self::InvalidLevel { reason } => write!(f, "invalid level data: {reason}"),
            Self::MissingSpawn { level } => write!(
                f,
                "level {level} has no player spawn marker (7); add one to the level file"
            ),
            Self::Config { reason } => write!(f, "invalid configuration: {reason}"),
            Self::Io(err) => write!(f, "i/o error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GameError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
