//! Game configuration
//!
//! Stored as JSON. Every key is optional; missing keys take their defaults
//! and the merged result is written back so the file lists every setting.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audio::Volumes;
use crate::consts::*;
use crate::error::GameError;

/// Environment variable overriding `tick_rate`.
pub const TICK_RATE_ENV: &str = "MAZE_CHASE_TICK_RATE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pixels per tile
    pub tile_size: f32,
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Level files, played in order
    pub levels: Vec<PathBuf>,
    pub lives: u32,
    pub power_duration_secs: f32,
    pub respawn_delay_secs: f32,
    /// One fruit placement attempt succeeds in this many ticks on average
    pub fruit_spawn_odds: u32,
    pub max_fruits: u32,
    /// Ticks per animation frame
    pub animation_delay: u32,
    pub animation_frames: u32,
    pub highscores_path: PathBuf,
    /// Sound effect volume, 0.0 to 1.0
    pub sound_volume: f32,
    /// Music volume, 0.0 to 1.0
    pub music_volume: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            tick_rate: DEFAULT_TICK_RATE,
            levels: vec![
                PathBuf::from("assets/levels/level1.csv"),
                PathBuf::from("assets/levels/level2.csv"),
                PathBuf::from("assets/levels/level3.csv"),
            ],
            lives: DEFAULT_LIVES,
            power_duration_secs: DEFAULT_POWER_SECS,
            respawn_delay_secs: DEFAULT_RESPAWN_SECS,
            fruit_spawn_odds: DEFAULT_FRUIT_ODDS,
            max_fruits: DEFAULT_MAX_FRUITS,
            animation_delay: DEFAULT_ANIMATION_DELAY,
            animation_frames: DEFAULT_ANIMATION_FRAMES,
            highscores_path: PathBuf::from("highscores.json"),
            sound_volume: DEFAULT_VOLUME,
            music_volume: DEFAULT_VOLUME,
        }
    }
}

impl Config {
    /// Load `path`, falling back to defaults when it is missing or not valid
    /// JSON. Either way the effective config is written back to `path`.
    pub fn load(path: &Path) -> Result<Self, GameError> {
        let config = match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<Config>(&text) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(err) => {
                    log::warn!("Config {} is not valid ({err}), using defaults", path.display());
                    Config::default()
                }
            },
            Err(err) => {
                log::warn!("Cannot read config {} ({err}), using defaults", path.display());
                Config::default()
            }
        };
        config.validate()?;
        if let Err(err) = config.save(path) {
            log::warn!("Cannot write config {}: {err}", path.display());
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), GameError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), GameError> {
        let fail = |reason: &str| {
            Err(GameError::Config {
                reason: reason.to_string(),
            })
        };
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return fail("tile_size must be positive");
        }
        if self.tick_rate == 0 {
            return fail("tick_rate must be positive");
        }
        if self.levels.is_empty() {
            return fail("at least one level is required");
        }
        if self.lives == 0 {
            return fail("lives must be at least 1");
        }
        if !(self.power_duration_secs.is_finite() && self.power_duration_secs >= 0.0) {
            return fail("power_duration_secs must be zero or more");
        }
        if !(self.respawn_delay_secs.is_finite() && self.respawn_delay_secs >= 0.0) {
            return fail("respawn_delay_secs must be zero or more");
        }
        if self.fruit_spawn_odds == 0 {
            return fail("fruit_spawn_odds must be positive");
        }
        if self.animation_frames == 0 {
            return fail("animation_frames must be positive");
        }
        if !(0.0..=1.0).contains(&self.sound_volume) {
            return fail("sound_volume must be between 0 and 1");
        }
        if !(0.0..=1.0).contains(&self.music_volume) {
            return fail("music_volume must be between 0 and 1");
        }
        Ok(())
    }

    /// Apply `MAZE_CHASE_TICK_RATE` when it holds a positive integer.
    pub fn apply_env(&mut self) {
        if let Some(rate) = std::env::var(TICK_RATE_ENV)
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|v| *v > 0)
        {
            self.tick_rate = rate;
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.tick_rate.max(1)))
    }

    pub fn volumes(&self) -> Volumes {
        Volumes {
            sound: self.sound_volume,
            music: self.music_volume,
        }
    }

    pub fn tuning(&self) -> Tuning {
        Tuning {
            tile: self.tile_size,
            lives: self.lives,
            power_duration: secs(self.power_duration_secs, DEFAULT_POWER_SECS),
            respawn_delay: secs(self.respawn_delay_secs, DEFAULT_RESPAWN_SECS),
            fruit_odds: self.fruit_spawn_odds.max(1),
            max_fruits: self.max_fruits,
            animation_delay: self.animation_delay.max(1),
            animation_frames: self.animation_frames.max(1),
        }
    }
}

fn secs(value: f32, fallback: f32) -> Duration {
    Duration::try_from_secs_f32(value).unwrap_or(Duration::from_secs_f32(fallback))
}

/// Gameplay values a session needs, resolved from `Config`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuning {
    pub tile: f32,
    pub lives: u32,
    pub power_duration: Duration,
    pub respawn_delay: Duration,
    pub fruit_odds: u32,
    pub max_fruits: u32,
    pub animation_delay: u32,
    pub animation_frames: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Config::default().tuning()
    }
}
