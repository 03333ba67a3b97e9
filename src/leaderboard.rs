//! Best completion times
//!
//! The engine only reports elapsed time and collected count at session end;
//! the leaderboard keeps the ten fastest runs in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyPreset;
use crate::storage;

const STORAGE_KEY: &str = "folio_runner_leaderboard";

/// Maximum number of runs to keep
pub const MAX_ENTRIES: usize = 10;

/// One finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    /// Completion time in seconds
    pub elapsed_secs: f64,
    pub collected: usize,
    pub difficulty: DifficultyPreset,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Fastest runs, sorted ascending by time
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<RunRecord>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Check if a time would make the board
    pub fn qualifies(&self, elapsed_secs: f64) -> bool {
        if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries
            .last()
            .map(|e| elapsed_secs < e.elapsed_secs)
            .unwrap_or(true)
    }

    /// Rank a time would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, elapsed_secs: f64) -> Option<usize> {
        if !self.qualifies(elapsed_secs) {
            return None;
        }
        let rank = self.entries.iter().position(|e| elapsed_secs < e.elapsed_secs);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a run; returns its rank (1-indexed) or None if it didn't qualify
    pub fn add_run(&mut self, record: RunRecord) -> Option<usize> {
        if !self.qualifies(record.elapsed_secs) {
            return None;
        }

        // Ties keep the earlier run ahead
        let pos = self
            .entries
            .iter()
            .position(|e| record.elapsed_secs < e.elapsed_secs);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, record);
                i + 1
            }
            None => {
                self.entries.push(record);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_ENTRIES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best_time(&self) -> Option<f64> {
        self.entries.first().map(|e| e.elapsed_secs)
    }

    pub fn load() -> Self {
        match storage::read::<Leaderboard>(STORAGE_KEY) {
            Some(board) => {
                log::info!("Loaded {} leaderboard entries", board.entries.len());
                board
            }
            None => Self::new(),
        }
    }

    pub fn save(&self) {
        if storage::write(STORAGE_KEY, self) {
            log::info!("Leaderboard saved ({} entries)", self.entries.len());
        }
    }
}

/// `m:ss.t` for times under an hour, `h:mm:ss` beyond
pub fn format_duration(secs: f64) -> String {
    let secs = secs.max(0.0);
    let total_tenths = (secs * 10.0).floor() as u64;
    let tenths = total_tenths % 10;
    let total_secs = total_tenths / 10;
    let (h, m, s) = (total_secs / 3600, (total_secs / 60) % 60, total_secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}.{tenths}")
    }
}
