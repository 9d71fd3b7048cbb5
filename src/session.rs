//! Session state: everything one play-through owns, from the first level to
//! game over.

use std::fmt;
use std::time::{Duration, Instant};

use crate::audio::Cue;
use crate::config::Tuning;
use crate::error::GameError;
use crate::ghost::Ghost;
use crate::grid::Grid;
use crate::level::LevelSource;
use crate::player::{spawn_point, Player};
use crate::power::PowerMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    OutOfLives,
    AllLevelsCleared,
    /// The next level could not be loaded.
    LevelUnavailable,
    Quit,
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::OutOfLives => "out of lives",
            Self::AllLevelsCleared => "all levels cleared",
            Self::LevelUnavailable => "next level unavailable",
            Self::Quit => "quit",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub tuning: Tuning,
    pub grid: Grid,
    pub player: Player,
    pub ghosts: Vec<Ghost>,
    pub power: PowerMode,
    pub score: u64,
    /// Zero-based index of the level being played.
    pub level: usize,
    /// Fruits believed to be on the grid; an approximate cap, not a tally.
    pub fruits: u32,
    pub game_over: Option<GameOverReason>,
    /// Best stored score when the session started.
    pub best_score: u64,
    pub anim_frame: u32,
    pub ticks: u64,
    pub started_at: Instant,
    /// The player is dead and waiting out the respawn delay.
    pub waiting_to_respawn: bool,
    anim_counter: u32,
    highscore_announced: bool,
    cues: Vec<Cue>,
}

impl Session {
    /// Start at the first level. If it cannot be loaded, play the built-in
    /// placeholder maze instead.
    pub fn new(
        tuning: Tuning,
        levels: &impl LevelSource,
        best_score: u64,
        now: Instant,
    ) -> Result<Self, GameError> {
        let grid = match levels.load(0) {
            Ok(grid) => grid,
            Err(err) if err.is_level_load_failure() => {
                log::warn!("First level unavailable ({err}), using placeholder maze");
                Grid::placeholder()
            }
            Err(err) => return Err(err),
        };
        let player = Player::spawn(&grid, tuning.tile, tuning.lives, 0)?;
        let ghosts = Ghost::spawn_all(&grid, tuning.tile);
        log::info!(
            "New session: {}x{} grid, {} ghosts, {} lives",
            grid.width(),
            grid.height(),
            ghosts.len(),
            player.lives
        );
        Ok(Self {
            power: PowerMode::new(tuning.power_duration),
            tuning,
            grid,
            player,
            ghosts,
            score: 0,
            level: 0,
            fruits: 0,
            game_over: None,
            best_score,
            anim_frame: 0,
            ticks: 0,
            started_at: now,
            waiting_to_respawn: false,
            anim_counter: 0,
            highscore_announced: false,
            cues: Vec::new(),
        })
    }

    pub fn is_over(&self) -> bool {
        self.game_over.is_some()
    }

    /// The first reason wins.
    pub fn end(&mut self, reason: GameOverReason) {
        if self.game_over.is_none() {
            log::info!(
                "Game over ({reason}) at level {} with score {}",
                self.level + 1,
                self.score
            );
            self.game_over = Some(reason);
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    pub fn emit(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    /// Cues raised since the last call.
    pub fn take_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    pub fn add_score(&mut self, points: u64) {
        self.score += points;
        if !self.highscore_announced && self.best_score > 0 && self.score > self.best_score {
            self.highscore_announced = true;
            self.emit(Cue::Highscore);
        }
    }

    /// Move on to the next level, or end the session when there is none.
    pub fn advance_level(
        &mut self,
        levels: &impl LevelSource,
        now: Instant,
    ) -> Result<(), GameError> {
        let next = self.level + 1;
        if next >= levels.level_count() {
            self.end(GameOverReason::AllLevelsCleared);
            return Ok(());
        }
        let grid = match levels.load(next) {
            Ok(grid) => grid,
            Err(err) if err.is_level_load_failure() => {
                log::warn!("Cannot load level {}: {err}", next + 1);
                self.end(GameOverReason::LevelUnavailable);
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        let tile = self.tuning.tile;
        let origin = spawn_point(&grid, tile, next)?;

        self.ghosts = Ghost::spawn_all(&grid, tile);
        self.grid = grid;
        self.level = next;
        self.fruits = 0;
        self.power = PowerMode::new(self.tuning.power_duration);
        self.player.lives += 1;
        self.player.relocate(origin);
        // Breather before the new level: the player sits out one respawn
        // delay without losing a life.
        self.player.body.kill(now);
        self.waiting_to_respawn = true;
        self.emit(Cue::LevelTheme);
        log::info!(
            "Level {} started, {} lives, score {}",
            next + 1,
            self.player.lives,
            self.score
        );
        Ok(())
    }

    /// Step the sprite animation once per `animation_delay` ticks.
    pub fn animate(&mut self) {
        self.anim_counter += 1;
        if self.anim_counter >= self.tuning.animation_delay {
            self.anim_counter = 0;
            self.anim_frame = (self.anim_frame + 1) % self.tuning.animation_frames;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;
    use crate::level::StaticLevels;

    fn levels() -> StaticLevels {
        StaticLevels::new(vec![
            vec![vec![7, 0, 5]],
            vec![vec![0, 5, 0], vec![5, 7, 0]],
        ])
    }

    #[test]
    fn starts_at_the_first_level() {
        let session = Session::new(Tuning::default(), &levels(), 1500, Instant::now()).unwrap();
        assert_eq!(session.level, 0);
        assert_eq!(session.ghosts.len(), 1);
        assert_eq!(session.player.lives, 3);
        assert!(!session.is_over());
    }

    #[test]
    fn unreadable_first_level_falls_back_to_placeholder() {
        let session =
            Session::new(Tuning::default(), &StaticLevels::default(), 0, Instant::now()).unwrap();
        assert_eq!(session.grid, Grid::placeholder());
        assert!(session.ghosts.is_empty());
    }

    #[test]
    fn missing_spawn_is_fatal() {
        let levels = StaticLevels::single(vec![vec![0, 0]]);
        let err = Session::new(Tuning::default(), &levels, 0, Instant::now()).unwrap_err();
        assert!(matches!(err, GameError::MissingSpawn { level: 0 }));
    }

    #[test]
    fn advance_rebuilds_the_level_and_adds_a_life() {
        let t0 = Instant::now();
        let levels = levels();
        let mut session = Session::new(Tuning::default(), &levels, 0, t0).unwrap();
        session.score = 40;
        session.fruits = 2;

        session.advance_level(&levels, t0).unwrap();
        assert_eq!(session.level, 1);
        assert_eq!(session.player.lives, 4);
        assert_eq!(session.score, 40);
        assert_eq!(session.fruits, 0);
        assert_eq!(session.ghosts.len(), 2);
        assert_eq!(session.grid.get(2, 2), Some(Cell::PlayerSpawn));
        assert!(!session.player.body.alive);
        assert_eq!(session.take_cues(), vec![Cue::LevelTheme]);
    }

    #[test]
    fn advancing_past_the_last_level_ends_the_game() {
        let t0 = Instant::now();
        let levels = levels();
        let mut session = Session::new(Tuning::default(), &levels, 0, t0).unwrap();
        session.advance_level(&levels, t0).unwrap();
        session.advance_level(&levels, t0).unwrap();
        assert_eq!(session.game_over, Some(GameOverReason::AllLevelsCleared));
    }

    #[test]
    fn broken_next_level_ends_the_game() {
        let t0 = Instant::now();
        let levels = StaticLevels::new(vec![vec![vec![7]], vec![vec![0], vec![0, 0]]]);
        let mut session = Session::new(Tuning::default(), &levels, 0, t0).unwrap();
        session.advance_level(&levels, t0).unwrap();
        assert_eq!(session.game_over, Some(GameOverReason::LevelUnavailable));
        assert_eq!(session.level, 0);
    }

    #[test]
    fn highscore_cue_fires_once() {
        let mut session = Session::new(Tuning::default(), &levels(), 100, Instant::now()).unwrap();
        session.add_score(100);
        assert!(session.take_cues().is_empty());
        session.add_score(10);
        session.add_score(10);
        assert_eq!(session.take_cues(), vec![Cue::Highscore]);
    }

    #[test]
    fn animation_wraps() {
        let mut session = Session::new(Tuning::default(), &levels(), 0, Instant::now()).unwrap();
        for _ in 0..9 {
            session.animate();
        }
        assert_eq!(session.anim_frame, 0);
        for _ in 0..3 {
            session.animate();
        }
        assert_eq!(session.anim_frame, 1);
    }
}
