//! Maze Chase - a tile-based arcade maze game for the terminal
//!
//! The simulation core (`grid`, `collision`, `player`, `ghost`, `power`,
//! `rules`, `session`, `tick`) is free of terminal and file access. The
//! remaining modules are the collaborators the core talks to: level files,
//! configuration, input, audio cues, highscores, rendering and menus.

pub mod audio;
pub mod collision;
pub mod components;
pub mod config;
pub mod error;
pub mod ghost;
pub mod grid;
pub mod highscores;
pub mod input;
pub mod level;
pub mod menu;
pub mod player;
pub mod power;
pub mod render;
pub mod rules;
pub mod runner;
pub mod session;
pub mod tick;

pub use audio::{Cue, CueSink, Volumes};
pub use components::{Body, Dir, Pos};
pub use config::{Config, Tuning};
pub use error::GameError;
pub use grid::{Cell, Grid};
pub use highscores::HighScores;
pub use input::InputSnapshot;
pub use level::{FileLevels, LevelSource, StaticLevels};
pub use session::{GameOverReason, Session};
pub use tick::tick;

/// Gameplay constants that are not exposed through the config file.
pub mod consts {
    pub const POINT_SCORE: u64 = 10;
    pub const FRUIT_SCORE: u64 = 100;
    pub const GHOST_SCORE: u64 = 200;

    /// Player moves a quarter tile per tick.
    pub const PLAYER_SPEED_DIVISOR: f32 = 4.0;
    /// Ghosts move a fifth of a tile per tick, rounded down to whole pixels.
    pub const GHOST_SPEED_DIVISOR: f32 = 5.0;

    pub const DEFAULT_TILE_SIZE: f32 = 20.0;
    pub const DEFAULT_TICK_RATE: u32 = 30;
    pub const DEFAULT_LIVES: u32 = 3;
    pub const DEFAULT_POWER_SECS: f32 = 5.0;
    pub const DEFAULT_RESPAWN_SECS: f32 = 3.0;
    pub const DEFAULT_FRUIT_ODDS: u32 = 200;
    pub const DEFAULT_MAX_FRUITS: u32 = 2;
    pub const DEFAULT_ANIMATION_DELAY: u32 = 3;
    pub const DEFAULT_ANIMATION_FRAMES: u32 = 3;
    pub const DEFAULT_VOLUME: f32 = 0.5;
    /// Volume notches on the settings screen.
    pub const VOLUME_STEPS: u32 = 10;
}
