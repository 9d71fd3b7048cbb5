//! Level sources
//!
//! A level is a rectangular table of integer cell codes. Files are CSV, one
//! row per line; the loader pads the table with a border so the file only has
//! to describe the playable area.

use std::fs;
use std::path::PathBuf;

use crate::error::GameError;
use crate::grid::Grid;

/// Anything that can hand out levels by index.
pub trait LevelSource {
    fn level_count(&self) -> usize;

    /// Load level `index` as a validated, bordered grid.
    fn load(&self, index: usize) -> Result<Grid, GameError>;
}

/// Levels read from CSV files, in the configured order.
#[derive(Debug, Clone, Default)]
pub struct FileLevels {
    paths: Vec<PathBuf>,
}

impl FileLevels {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl LevelSource for FileLevels {
    fn level_count(&self) -> usize {
        self.paths.len()
    }

    fn load(&self, index: usize) -> Result<Grid, GameError> {
        let path = self
            .paths
            .get(index)
            .ok_or(GameError::LevelNotFound { index })?;
        let text = fs::read_to_string(path).map_err(|err| GameError::LevelUnreadable {
            path: path.clone(),
            reason: err.to_string(),
        })?;
        let grid = parse_csv(&text)?;
        log::info!(
            "Loaded level {} from {} ({}x{})",
            index + 1,
            path.display(),
            grid.width(),
            grid.height()
        );
        Ok(grid)
    }
}

/// Levels held in memory as unbordered code tables.
#[derive(Debug, Clone, Default)]
pub struct StaticLevels {
    levels: Vec<Vec<Vec<i32>>>,
}

impl StaticLevels {
    pub fn new(levels: Vec<Vec<Vec<i32>>>) -> Self {
        Self { levels }
    }

    pub fn single(rows: Vec<Vec<i32>>) -> Self {
        Self::new(vec![rows])
    }
}

impl LevelSource for StaticLevels {
    fn level_count(&self) -> usize {
        self.levels.len()
    }

    fn load(&self, index: usize) -> Result<Grid, GameError> {
        let rows = self
            .levels
            .get(index)
            .ok_or(GameError::LevelNotFound { index })?;
        Grid::with_border(rows)
    }
}

/// Parse CSV level text into a bordered grid. Blank lines are skipped.
pub fn parse_csv(text: &str) -> Result<Grid, GameError> {
    let mut rows = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row = line
            .split(',')
            .enumerate()
            .map(|(col, field)| {
                let field = field.trim();
                field.parse::<i32>().map_err(|_| GameError::InvalidLevel {
                    reason: format!(
                        "line {}, column {}: '{field}' is not an integer",
                        line_no + 1,
                        col + 1
                    ),
                })
            })
            .collect::<Result<Vec<i32>, GameError>>()?;
        rows.push(row);
    }
    Grid::with_border(&rows)
}
