use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::collision::{try_teleport, would_collide};
use crate::components::{Body, Dir, Pos};
use crate::consts::GHOST_SPEED_DIVISOR;
use crate::error::GameError;
use crate::grid::{pixel_to_tile, tile_to_pixel, Cell, Grid};

/// What a ghost did during its step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostStep {
    Moved,
    /// The way ahead was blocked; a new heading was drawn, no movement.
    Blocked,
    Teleported,
    /// Moved onto a junction and drew a new heading.
    Junction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ghost {
    pub body: Body,
    /// Speed outside power mode.
    pub base_speed: f32,
    pub frightened: bool,
    /// Sprite/colour index, stable for the ghost's lifetime.
    pub variant: usize,
}

impl Ghost {
    pub fn new(origin: Pos, tile: f32, variant: usize) -> Self {
        let speed = ghost_speed(tile);
        Self {
            body: Body::new(origin, speed),
            base_speed: speed,
            frightened: false,
            variant,
        }
    }

    /// One ghost per spawn marker, in row-major order.
    pub fn spawn_all(grid: &Grid, tile: f32) -> Vec<Ghost> {
        grid.find(Cell::GhostSpawn)
            .into_iter()
            .enumerate()
            .map(|(i, (x, y))| Ghost::new(tile_to_pixel(x, y, tile), tile, i))
            .collect()
    }

    pub fn step(
        &mut self,
        grid: &Grid,
        tile: f32,
        rng: &mut impl Rng,
    ) -> Result<GhostStep, GameError> {
        let body = &mut self.body;
        if would_collide(grid, tile, body.dir, body.speed, body.pos, true)? {
            self.redirect(rng);
            return Ok(GhostStep::Blocked);
        }
        body.advance(grid, tile, true)?;
        if try_teleport(grid, tile, &mut body.pos, body.dir)? {
            return Ok(GhostStep::Teleported);
        }
        if self.at_intersection(grid, tile)? {
            self.redirect(rng);
            return Ok(GhostStep::Junction);
        }
        Ok(GhostStep::Moved)
    }

    /// More than one non-reversing heading is open from here.
    pub fn at_intersection(&self, grid: &Grid, tile: f32) -> Result<bool, GameError> {
        let body = &self.body;
        let (tx, ty) = pixel_to_tile(body.pos, tile);
        if grid.cell_at(tx, ty)? == Cell::Border {
            return Ok(false);
        }
        let back = body.dir.reverse();
        let mut open = 0;
        for dir in Dir::ALL.into_iter().filter(|&dir| dir != back) {
            if !would_collide(grid, tile, dir, body.speed, body.pos, true)? {
                open += 1;
            }
        }
        Ok(open > 1)
    }

    pub fn redirect(&mut self, rng: &mut impl Rng) {
        let from = self.body.dir;
        self.body.dir = pick_heading(from, rng);
        log::debug!("ghost {} turned {:?} -> {:?}", self.variant, from, self.body.dir);
    }

    pub fn frighten(&mut self) {
        self.frightened = true;
        self.body.speed /= 2.0;
    }

    pub fn calm(&mut self) {
        self.frightened = false;
        self.body.speed = self.base_speed;
    }

    pub fn die(&mut self, now: Instant) -> bool {
        self.body.kill(now)
    }

    pub fn respawn(&mut self) {
        self.body.respawn();
        self.calm();
    }
}

/// Uniform pick among the three headings that are not a reversal of `current`.
/// Blocked headings are not filtered out; a boxed-in ghost simply stalls and
/// redraws on its next step.
pub fn pick_heading(current: Dir, rng: &mut impl Rng) -> Dir {
    let back = current.reverse();
    let options: Vec<Dir> = Dir::ALL.into_iter().filter(|d| *d != back).collect();
    options.choose(rng).copied().unwrap_or(current)
}

pub fn ghost_speed(tile: f32) -> f32 {
    (tile / GHOST_SPEED_DIVISOR).floor().max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TILE: f32 = 20.0;

    #[test]
    fn spawns_one_ghost_per_marker() {
        let grid = Grid::with_border(&[vec![5, 0, 5], vec![0, 7, 0], vec![0, 5, 0]]).unwrap();
        let ghosts = Ghost::spawn_all(&grid, TILE);
        assert_eq!(ghosts.len(), 3);
        assert_eq!(ghosts[0].body.pos, Pos::new(20.0, 20.0));
        assert_eq!(ghosts[1].body.pos, Pos::new(60.0, 20.0));
        assert_eq!(ghosts[2].body.pos, Pos::new(40.0, 60.0));
        assert!(ghosts.iter().all(|g| g.body.speed == 4.0 && !g.frightened));
    }

    #[test]
    fn never_picks_the_reverse() {
        let mut rng = StdRng::seed_from_u64(7);
        for dir in Dir::ALL {
            for _ in 0..200 {
                assert_ne!(pick_heading(dir, &mut rng), dir.reverse());
            }
        }
    }

    #[test]
    fn pick_covers_all_three_options() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(pick_heading(Dir::Up, &mut rng));
        }
        assert_eq!(seen.len(), 3);
        assert!(!seen.contains(&Dir::Down));
    }

    #[test]
    fn blocked_ghost_redirects_without_moving() {
        // Ghost in a one-tile pocket facing a wall.
        let grid = Grid::with_border(&[vec![1, 1, 1], vec![1, 5, 1], vec![1, 0, 1]]).unwrap();
        let mut ghost = Ghost::spawn_all(&grid, TILE).remove(0);
        ghost.body.dir = Dir::Up;
        let start = ghost.body.pos;
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(ghost.step(&grid, TILE, &mut rng).unwrap(), GhostStep::Blocked);
        assert_eq!(ghost.body.pos, start);
        assert_ne!(ghost.body.dir, Dir::Down);
    }

    #[test]
    fn boxed_in_ghost_only_stalls() {
        let grid = Grid::with_border(&[vec![1, 1, 1], vec![1, 5, 1], vec![1, 1, 1]]).unwrap();
        let mut ghost = Ghost::spawn_all(&grid, TILE).remove(0);
        let start = ghost.body.pos;
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            assert_eq!(ghost.step(&grid, TILE, &mut rng).unwrap(), GhostStep::Blocked);
            assert_eq!(ghost.body.pos, start);
        }
    }

    #[test]
    fn corridor_is_not_an_intersection() {
        let grid = Grid::with_border(&[
            vec![1, 1, 1, 1, 1],
            vec![1, 5, 0, 0, 1],
            vec![1, 1, 1, 1, 1],
        ])
        .unwrap();
        let ghost = Ghost::spawn_all(&grid, TILE).remove(0);
        assert!(!ghost.at_intersection(&grid, TILE).unwrap());
    }

    #[test]
    fn junction_is_an_intersection() {
        let grid = Grid::with_border(&[
            vec![1, 1, 0, 1, 1],
            vec![1, 0, 5, 0, 1],
            vec![1, 1, 1, 1, 1],
        ])
        .unwrap();
        let ghost = Ghost::spawn_all(&grid, TILE).remove(0);
        // Facing right: right and up are open, left is the reverse.
        assert!(ghost.at_intersection(&grid, TILE).unwrap());
    }

    #[test]
    fn ghost_wraps_through_an_open_tunnel() {
        let grid = Grid::with_border(&[
            vec![1, 1, 1, 1],
            vec![5, 0, 0, 0],
            vec![1, 1, 1, 1],
        ])
        .unwrap();
        let mut ghost = Ghost::spawn_all(&grid, TILE).remove(0);
        ghost.body.dir = Dir::Left;
        let mut rng = StdRng::seed_from_u64(9);

        assert_eq!(ghost.step(&grid, TILE, &mut rng).unwrap(), GhostStep::Teleported);
        assert_eq!(ghost.body.pos, Pos::new(80.0, 40.0));
        assert_eq!(ghost.body.dir, Dir::Left);
    }

    #[test]
    fn ghosts_stop_at_invisible_walls() {
        let grid = Grid::with_border(&[vec![5, 2, 0]]).unwrap();
        let mut ghost = Ghost::spawn_all(&grid, TILE).remove(0);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(ghost.step(&grid, TILE, &mut rng).unwrap(), GhostStep::Blocked);
    }

    #[test]
    fn frighten_and_calm_restore_base_speed() {
        let mut ghost = Ghost::new(Pos::new(20.0, 20.0), TILE, 0);
        ghost.frighten();
        assert_eq!(ghost.body.speed, 2.0);
        ghost.calm();
        assert_eq!(ghost.body.speed, 4.0);
        assert!(!ghost.frightened);
    }
}
