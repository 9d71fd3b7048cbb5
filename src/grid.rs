//! Maze grid: a rectangular matrix of cell codes surrounded by border cells.

use crate::components::Pos;
use crate::error::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Point,
    Empty,
    Fruit,
    PowerPill,
    Wall,
    /// Blocks ghosts only.
    InvisibleWall,
    /// Grid edge; stepping onto it wraps to the opposite side.
    Border,
    GhostSpawn,
    PlayerSpawn,
}

impl Cell {
    pub fn code(self) -> i32 {
        match self {
            Cell::Point => 0,
            Cell::Empty => -1,
            Cell::Fruit => -2,
            Cell::PowerPill => -3,
            Cell::Wall => 1,
            Cell::InvisibleWall => 2,
            Cell::Border => 3,
            Cell::GhostSpawn => 5,
            Cell::PlayerSpawn => 7,
        }
    }

    pub fn from_code(code: i32) -> Option<Cell> {
        Some(match code {
            0 => Cell::Point,
            -1 => Cell::Empty,
            -2 => Cell::Fruit,
            -3 => Cell::PowerPill,
            1 => Cell::Wall,
            2 => Cell::InvisibleWall,
            3 => Cell::Border,
            5 => Cell::GhostSpawn,
            7 => Cell::PlayerSpawn,
            _ => return None,
        })
    }

    pub fn is_pickup(self) -> bool {
        matches!(self, Cell::Point | Cell::Fruit | Cell::PowerPill)
    }

    /// Floor-like cells (code below 1) may receive a fruit.
    pub fn accepts_fruit(self) -> bool {
        self.code() < 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Build a grid from rows that already include their border.
    pub fn from_cells(cells: Vec<Vec<Cell>>) -> Result<Self, GameError> {
        let height = cells.len();
        let width = cells.first().map(|row| row.len()).unwrap_or(0);
        if width == 0 {
            return Err(GameError::InvalidLevel {
                reason: "level has no cells".to_string(),
            });
        }
        if let Some(idx) = cells.iter().position(|row| row.len() != width) {
            return Err(GameError::InvalidLevel {
                reason: format!(
                    "row {idx} has {} cells, expected {width}",
                    cells[idx].len()
                ),
            });
        }
        Ok(Self {
            cells,
            width,
            height,
        })
    }

    pub fn from_codes(rows: &[Vec<i32>]) -> Result<Self, GameError> {
        let mut cells = Vec::with_capacity(rows.len());
        for (y, row) in rows.iter().enumerate() {
            let mut out = Vec::with_capacity(row.len());
            for (x, code) in row.iter().enumerate() {
                let cell = Cell::from_code(*code).ok_or_else(|| GameError::InvalidLevel {
                    reason: format!("unknown cell code {code} at row {y}, column {x}"),
                })?;
                out.push(cell);
            }
            cells.push(out);
        }
        Self::from_cells(cells)
    }

    /// Surround unbordered rows with a one-cell ring of border cells.
    pub fn with_border(rows: &[Vec<i32>]) -> Result<Self, GameError> {
        let inner = rows.first().map(|row| row.len()).unwrap_or(0);
        if inner == 0 {
            return Err(GameError::InvalidLevel {
                reason: "level has no cells".to_string(),
            });
        }
        if let Some(idx) = rows.iter().position(|row| row.len() != inner) {
            return Err(GameError::InvalidLevel {
                reason: format!("row {idx} has {} cells, expected {inner}", rows[idx].len()),
            });
        }
        let mut padded = Vec::with_capacity(rows.len() + 2);
        padded.push(vec![Cell::Border.code(); inner + 2]);
        for row in rows {
            let mut line = Vec::with_capacity(row.len() + 2);
            line.push(Cell::Border.code());
            line.extend_from_slice(row);
            line.push(Cell::Border.code());
            padded.push(line);
        }
        padded.push(vec![Cell::Border.code(); inner + 2]);
        Self::from_codes(&padded)
    }

    /// Minimal walled room with a single player spawn.
    pub fn placeholder() -> Self {
        let rows = [
            [3, 3, 3, 3, 3, 3, 3, 3],
            [3, 1, 1, 1, 1, 1, 1, 3],
            [3, 1, 0, 0, 0, 0, 1, 3],
            [3, 1, 0, 7, 0, 0, 1, 3],
            [3, 1, 0, 0, 0, 0, 1, 3],
            [3, 1, 1, 1, 1, 1, 1, 3],
            [3, 3, 3, 3, 3, 3, 3, 3],
        ];
        let cells = rows
            .iter()
            .map(|row| row.iter().filter_map(|c| Cell::from_code(*c)).collect())
            .collect();
        Self {
            cells,
            width: 8,
            height: 7,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_at(&self, x: i64, y: i64) -> Result<Cell, GameError> {
        self.get(x, y).ok_or(GameError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })
    }

    pub fn get(&self, x: i64, y: i64) -> Option<Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.cells
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(y).and_then(|row| row.get_mut(x)) {
            *slot = cell;
        }
    }

    /// Replace a pickup with empty floor, returning what was there.
    pub fn consume(&mut self, x: usize, y: usize) -> Option<Cell> {
        let slot = self.cells.get_mut(y)?.get_mut(x)?;
        if !slot.is_pickup() {
            return None;
        }
        let taken = *slot;
        *slot = Cell::Empty;
        Some(taken)
    }

    pub fn has_points(&self) -> bool {
        self.cells.iter().flatten().any(|c| *c == Cell::Point)
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().flatten().filter(|c| **c == cell).count()
    }

    /// Tile coordinates of every cell equal to `cell`, row-major.
    pub fn find(&self, cell: Cell) -> Vec<(usize, usize)> {
        let mut found = Vec::new();
        for (y, row) in self.cells.iter().enumerate() {
            for (x, c) in row.iter().enumerate() {
                if *c == cell {
                    found.push((x, y));
                }
            }
        }
        found
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.cells
    }
}

/// Tile containing a pixel-space position.
pub fn pixel_to_tile(pos: Pos, tile: f32) -> (i64, i64) {
    (
        (pos.x / tile).floor() as i64,
        (pos.y / tile).floor() as i64,
    )
}

pub fn tile_to_pixel(x: usize, y: usize, tile: f32) -> Pos {
    Pos::new(x as f32 * tile, y as f32 * tile)
}
