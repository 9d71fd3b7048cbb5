use std::time::Instant;

use rand::Rng;

use crate::collision::try_teleport;
use crate::error::GameError;
use crate::input::InputSnapshot;
use crate::level::LevelSource;
use crate::rules;
use crate::session::{GameOverReason, Session};

/// Advance the session by one fixed step.
///
/// Order within a tick: respawns, movement, contacts, player wrap, power
/// timer, pickups, level advance, fruit, animation. Cues raised along the way
/// are queued on the session.
///
/// Errors are `OutOfBounds` when an entity has left the grid and
/// `MissingSpawn` when the next level has no player marker.
pub fn tick(
    session: &mut Session,
    levels: &impl LevelSource,
    input: &InputSnapshot,
    now: Instant,
    rng: &mut impl Rng,
) -> Result<(), GameError> {
    if session.is_over() {
        return Ok(());
    }
    if input.back {
        session.end(GameOverReason::Quit);
        return Ok(());
    }
    session.ticks += 1;
    let desired = input.heading();
    let tile = session.tuning.tile;
    let delay = session.tuning.respawn_delay;

    for ghost in session.ghosts.iter_mut() {
        if ghost.body.respawn_due(now, delay) {
            ghost.respawn();
        }
    }

    if !session.player.body.alive {
        if session.player.body.respawn_due(now, delay) {
            session.player.body.respawn();
            session.waiting_to_respawn = false;
        } else {
            session.waiting_to_respawn = true;
        }
    } else {
        session.player.step(desired, &session.grid, tile)?;
        for ghost in session.ghosts.iter_mut().filter(|g| g.body.alive) {
            ghost.step(&session.grid, tile, rng)?;
        }
    }

    rules::resolve_contacts(session, now);

    if session.player.body.alive {
        let body = &mut session.player.body;
        try_teleport(&session.grid, tile, &mut body.pos, body.dir)?;
    }

    session.power.update(now, &mut session.ghosts);

    if rules::consume_tile(session, now)? {
        log::info!("Level {} cleared", session.level + 1);
        session.advance_level(levels, now)?;
    }

    if !session.is_over() {
        rules::place_fruit(session, rng);
    }

    session.animate();
    Ok(())
}
