use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::collision::would_collide;
use crate::error::GameError;
use crate::grid::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Dir {
    Up,
    Down,
    Left,
    #[default]
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    pub fn delta(self) -> (f32, f32) {
        match self {
            Dir::Up => (0.0, -1.0),
            Dir::Down => (0.0, 1.0),
            Dir::Left => (-1.0, 0.0),
            Dir::Right => (1.0, 0.0),
        }
    }

    pub fn reverse(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// Pixel-space position of an entity's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pos {
    pub x: f32,
    pub y: f32,
}

impl Pos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dir: Dir, amount: f32) -> Pos {
        let (dx, dy) = dir.delta();
        Pos {
            x: self.x + dx * amount,
            y: self.y + dy * amount,
        }
    }
}

/// Movement and life-cycle state shared by the player and the ghosts.
///
/// The bounding box is always exactly one tile.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub pos: Pos,
    pub origin: Pos,
    pub dir: Dir,
    pub speed: f32,
    pub alive: bool,
    pub died_at: Option<Instant>,
}

impl Body {
    pub fn new(origin: Pos, speed: f32) -> Self {
        Self {
            pos: origin,
            origin,
            dir: Dir::default(),
            speed,
            alive: true,
            died_at: None,
        }
    }

    /// Advance one step along `dir` unless the moved box would hit a blocking
    /// cell. Returns whether the body moved.
    pub fn advance(
        &mut self,
        grid: &Grid,
        tile: f32,
        blocks_invisible: bool,
    ) -> Result<bool, GameError> {
        if would_collide(grid, tile, self.dir, self.speed, self.pos, blocks_invisible)? {
            return Ok(false);
        }
        self.pos = self.pos.offset(self.dir, self.speed);
        Ok(true)
    }

    /// Returns false if the body was already dead.
    pub fn kill(&mut self, now: Instant) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        self.died_at = Some(now);
        self.pos = self.origin;
        self.dir = Dir::default();
        true
    }

    pub fn respawn(&mut self) {
        self.pos = self.origin;
        self.dir = Dir::default();
        self.alive = true;
        self.died_at = None;
    }

    pub fn respawn_due(&self, now: Instant, delay: Duration) -> bool {
        match (self.alive, self.died_at) {
            (false, Some(t)) => now.saturating_duration_since(t) > delay,
            _ => false,
        }
    }

    /// Centre of the bounding box.
    pub fn center(&self, tile: f32) -> Pos {
        Pos::new(self.pos.x + tile / 2.0, self.pos.y + tile / 2.0)
    }
}
