//! Local leaderboard, stored as JSON (XDG config or ~/.config/hexhive).

use anyhow::{Context, Result};
use hexhive::ScoreSubmission;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const FILENAME: &str = "leaderboard.json";
/// Entries kept on disk and shown on the menu.
pub const MAX_ENTRIES: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub nickname: String,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<Entry>,
}

/// Returns the path to the leaderboard file (config dir / hexhive / leaderboard.json).
fn config_path() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join("hexhive").join(FILENAME)
}

impl Leaderboard {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn best(&self) -> u32 {
        self.entries.first().map_or(0, |e| e.score)
    }

    /// Insert a finished round, keeping the best `MAX_ENTRIES` by score.
    /// Returns the 0-based rank, or `None` if it did not make the cut.
    pub fn insert(&mut self, nickname: &str, result: ScoreSubmission) -> Option<usize> {
        if result.score == 0 {
            return None;
        }
        let rank = self
            .entries
            .iter()
            .position(|e| result.score > e.score)
            .unwrap_or(self.entries.len());
        if rank >= MAX_ENTRIES {
            return None;
        }
        self.entries.insert(
            rank,
            Entry {
                nickname: nickname.to_string(),
                score: result.score,
                level: result.level,
                lines: result.lines_cleared,
            },
        );
        self.entries.truncate(MAX_ENTRIES);
        Some(rank)
    }

    /// Load from the default location. Missing or unreadable files give an empty board.
    pub fn load() -> Self {
        Self::load_from(&config_path()).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "no leaderboard loaded");
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let mut board: Self = serde_json::from_slice(&bytes)?;
        board.entries.sort_by(|a, b| b.score.cmp(&a.score));
        board.entries.truncate(MAX_ENTRIES);
        Ok(board)
    }

    /// Save to the default location. Creates the config directory if needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: u32) -> ScoreSubmission {
        ScoreSubmission {
            score,
            level: 1 + score / 1000,
            lines_cleared: score / 100,
        }
    }

    #[test]
    fn keeps_best_first_and_caps_length() {
        let mut lb = Leaderboard::default();
        for s in 1..=20 {
            lb.insert("bee", result(s * 100));
        }
        assert_eq!(lb.entries().len(), MAX_ENTRIES);
        assert_eq!(lb.best(), 2000);
        assert_eq!(lb.entries().last().map(|e| e.score), Some(600));
        assert_eq!(lb.insert("late", result(100)), None);
        assert_eq!(lb.insert("top", result(5000)), Some(0));
    }

    #[test]
    fn zero_scores_are_not_recorded() {
        let mut lb = Leaderboard::default();
        assert_eq!(lb.insert("idle", result(0)), None);
        assert!(lb.entries().is_empty());
    }

    #[test]
    fn survives_a_disk_round_trip() {
        let dir = std::env::temp_dir().join(format!("hexhive-lb-{}", std::process::id()));
        let path = dir.join(FILENAME);
        let mut lb = Leaderboard::default();
        lb.insert("drone", result(700));
        lb.save_to(&path).unwrap();
        assert_eq!(Leaderboard::load_from(&path).unwrap(), lb);
        let _ = fs::remove_dir_all(dir);
    }
}
