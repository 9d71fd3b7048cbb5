use std::time::Instant;

use crate::collision::would_collide;
use crate::components::{Body, Dir, Pos};
use crate::consts::PLAYER_SPEED_DIVISOR;
use crate::error::GameError;
use crate::grid::{tile_to_pixel, Cell, Grid};

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub body: Body,
    pub lives: u32,
}

impl Player {
    pub fn new(origin: Pos, tile: f32, lives: u32) -> Self {
        Self {
            body: Body::new(origin, tile / PLAYER_SPEED_DIVISOR),
            lives,
        }
    }

    /// Spawn at the first player marker of the grid.
    pub fn spawn(grid: &Grid, tile: f32, lives: u32, level: usize) -> Result<Self, GameError> {
        let origin = spawn_point(grid, tile, level)?;
        Ok(Self::new(origin, tile, lives))
    }

    /// Take a new heading only when the first step along it is free.
    pub fn steer(
        &mut self,
        desired: Option<Dir>,
        grid: &Grid,
        tile: f32,
    ) -> Result<(), GameError> {
        let Some(dir) = desired else {
            return Ok(());
        };
        if dir == self.body.dir {
            return Ok(());
        }
        if !would_collide(grid, tile, dir, self.body.speed, self.body.pos, false)? {
            self.body.dir = dir;
        }
        Ok(())
    }

    pub fn step(
        &mut self,
        desired: Option<Dir>,
        grid: &Grid,
        tile: f32,
    ) -> Result<bool, GameError> {
        self.steer(desired, grid, tile)?;
        self.body.advance(grid, tile, false)
    }

    /// Lose a life. Has no effect while already dead.
    pub fn die(&mut self, now: Instant) -> bool {
        if !self.body.kill(now) {
            return false;
        }
        self.lives = self.lives.saturating_sub(1);
        true
    }

    /// Move to a new level's spawn point.
    pub fn relocate(&mut self, origin: Pos) {
        self.body.origin = origin;
        self.body.pos = origin;
        self.body.dir = Dir::default();
    }
}

pub fn spawn_point(grid: &Grid, tile: f32, level: usize) -> Result<Pos, GameError> {
    grid.find(Cell::PlayerSpawn)
        .first()
        .map(|&(x, y)| tile_to_pixel(x, y, tile))
        .ok_or(GameError::MissingSpawn { level })
}
