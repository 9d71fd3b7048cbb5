//! Tile-grid collision and edge wrapping.
//!
//! Every entity is a one-tile axis-aligned box. Movement is tested one axis
//! at a time: the box is translated by the step and checked against the
//! blocking cells it could touch.

use crate::components::{Dir, Pos};
use crate::error::GameError;
use crate::grid::{pixel_to_tile, tile_to_pixel, Cell, Grid};

/// Strict overlap of two `size`-sized boxes; touching edges do not overlap.
pub fn boxes_overlap(a: Pos, b: Pos, size: f32) -> bool {
    a.x < b.x + size && b.x < a.x + size && a.y < b.y + size && b.y < a.y + size
}

pub fn is_blocking(cell: Cell, blocks_invisible: bool) -> bool {
    match cell {
        Cell::Wall => true,
        Cell::InvisibleWall => blocks_invisible,
        _ => false,
    }
}

/// Would a one-tile box at `pos`, moved `speed` pixels along `dir`, overlap a
/// wall (or, with `blocks_invisible`, an invisible wall)?
///
/// Fails with `OutOfBounds` when `pos` itself lies outside the grid. While
/// crossing a tunnel the moved box may reach past the outer border; nothing
/// out there blocks.
pub fn would_collide(
    grid: &Grid,
    tile: f32,
    dir: Dir,
    speed: f32,
    pos: Pos,
    blocks_invisible: bool,
) -> Result<bool, GameError> {
    let (cx, cy) = pixel_to_tile(pos, tile);
    grid.cell_at(cx, cy)?;

    let moved = pos.offset(dir, speed);
    let max_x = grid.width() as i64 - 1;
    let max_y = grid.height() as i64 - 1;
    let x0 = ((moved.x / tile).floor() as i64).max(0);
    let x1 = ((moved.x / tile).ceil() as i64).min(max_x);
    let y0 = ((moved.y / tile).floor() as i64).max(0);
    let y1 = ((moved.y / tile).ceil() as i64).min(max_y);

    for ty in y0..=y1 {
        for tx in x0..=x1 {
            if !is_blocking(grid.cell_at(tx, ty)?, blocks_invisible) {
                continue;
            }
            let cell_pos = tile_to_pixel(tx as usize, ty as usize, tile);
            if boxes_overlap(moved, cell_pos, tile) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// If `pos` sits on a border cell, move it to the innermost open column or
/// row on the opposite edge, keeping the other coordinate.
pub fn try_teleport(grid: &Grid, tile: f32, pos: &mut Pos, dir: Dir) -> Result<bool, GameError> {
    let (tx, ty) = pixel_to_tile(*pos, tile);
    if grid.cell_at(tx, ty)? != Cell::Border {
        return Ok(false);
    }
    match dir {
        Dir::Right => pos.x = tile,
        Dir::Left => pos.x = tile * (grid.width() as f32 - 2.0),
        Dir::Up => pos.y = tile * (grid.height() as f32 - 2.0),
        Dir::Down => pos.y = tile,
    }
    Ok(true)
}
