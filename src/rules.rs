//! Contact and pickup resolution, plus ambient fruit placement.

use std::time::Instant;

use rand::Rng;

use crate::audio::Cue;
use crate::collision::boxes_overlap;
use crate::consts::{FRUIT_SCORE, GHOST_SCORE, POINT_SCORE};
use crate::error::GameError;
use crate::ghost::Ghost;
use crate::grid::{pixel_to_tile, Cell};
use crate::session::{GameOverReason, Session};

/// Resolve overlaps between the player and living ghosts.
///
/// Frightened ghosts are eaten. Any other ghost kills the player, after which
/// the ghost set is rebuilt from the spawn markers and power mode ends.
pub fn resolve_contacts(session: &mut Session, now: Instant) {
    if !session.player.body.alive {
        return;
    }
    let tile = session.tuning.tile;
    let player_pos = session.player.body.pos;
    let mut eaten = 0;
    let mut caught = false;
    for ghost in session.ghosts.iter_mut().filter(|g| g.body.alive) {
        if !boxes_overlap(player_pos, ghost.body.pos, tile) {
            continue;
        }
        if ghost.frightened {
            if ghost.die(now) {
                eaten += 1;
            }
        } else {
            caught = true;
            break;
        }
    }
    for _ in 0..eaten {
        session.add_score(GHOST_SCORE);
        session.emit(Cue::GhostEaten);
    }
    if caught {
        player_caught(session, now);
    }
}

fn player_caught(session: &mut Session, now: Instant) {
    if !session.player.die(now) {
        return;
    }
    session.emit(Cue::PlayerDeath);
    session.ghosts = Ghost::spawn_all(&session.grid, session.tuning.tile);
    session.power.cancel();
    log::info!("Player caught, {} lives left", session.player.lives);
    if session.player.lives == 0 {
        session.end(GameOverReason::OutOfLives);
    }
}

/// Apply the pickup under the player. Returns true when this cleared the
/// last point of the level.
pub fn consume_tile(session: &mut Session, now: Instant) -> Result<bool, GameError> {
    if !session.player.body.alive {
        return Ok(false);
    }
    let (tx, ty) = pixel_to_tile(session.player.body.pos, session.tuning.tile);
    if !session.grid.cell_at(tx, ty)?.is_pickup() {
        return Ok(false);
    }
    let cleared = match session.grid.consume(tx as usize, ty as usize) {
        Some(Cell::Point) => {
            session.add_score(POINT_SCORE);
            session.emit(Cue::Chomp);
            !session.grid.has_points()
        }
        Some(Cell::Fruit) => {
            session.add_score(FRUIT_SCORE);
            session.fruits = session.fruits.saturating_sub(1);
            session.emit(Cue::Fruit);
            false
        }
        Some(Cell::PowerPill) => {
            session.power.activate(now, &mut session.ghosts);
            session.emit(Cue::Power);
            false
        }
        _ => false,
    };
    Ok(cleared)
}

/// Maybe drop a fruit on a random tile. Returns true if one was placed.
///
/// Fruit may land on any floor-like cell, but never on the last remaining
/// point, which would leave the level impossible to clear.
pub fn place_fruit(session: &mut Session, rng: &mut impl Rng) -> bool {
    let tuning = &session.tuning;
    if session.fruits >= tuning.max_fruits || rng.gen_range(0..tuning.fruit_odds) != 0 {
        return false;
    }
    let x = rng.gen_range(0..session.grid.width());
    let y = rng.gen_range(0..session.grid.height());
    let Some(cell) = session.grid.get(x as i64, y as i64) else {
        return false;
    };
    if !cell.accepts_fruit() {
        return false;
    }
    if cell == Cell::Point && session.grid.count(Cell::Point) == 1 {
        return false;
    }
    session.grid.set(x, y, Cell::Fruit);
    session.fruits += 1;
    log::debug!("fruit placed at ({x}, {y})");
    true
}
