//! High score table
//!
//! Persisted as JSON, keeps the top 5 scores.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;

/// Longest accepted player name
pub const NAME_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u64,
    /// Level reached, 1-based
    #[serde(default)]
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The table a fresh install starts with.
    pub fn seeded() -> Self {
        let entry = |name: &str, score| HighScoreEntry {
            name: name.to_string(),
            score,
            level: 1,
        };
        Self {
            entries: vec![entry("AAA", 1500), entry("BBB", 1200), entry("CCC", 900)],
        }
    }

    /// Check if a score qualifies for the table
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a score if it qualifies. Returns the 1-based rank achieved.
    pub fn add(&mut self, name: &str, score: u64, level: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let entry = HighScoreEntry {
            name: name.chars().take(NAME_LEN).collect(),
            score,
            level,
        };

        // Sorted descending; ties go below existing entries.
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);
        log::info!("High score {score} by {name} at rank {rank}");
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Back to the seed table.
    pub fn reset(&mut self) {
        *self = Self::seeded();
        log::info!("High scores reset");
    }

    /// Load from `path`. A missing file gives the seed table; a corrupted one
    /// is replaced by it.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => {
                log::info!("No high scores at {}, starting fresh", path.display());
                return Self::seeded();
            }
        };
        match serde_json::from_str::<HighScores>(&text) {
            Ok(mut scores) => {
                scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
                scores.entries.truncate(MAX_HIGH_SCORES);
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Err(err) => {
                log::warn!(
                    "High score file {} is corrupted ({err}), resetting",
                    path.display()
                );
                Self::seeded()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), GameError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}
