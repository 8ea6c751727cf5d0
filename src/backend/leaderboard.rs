//! Local leaderboard cache
//!
//! Mirrors the last leaderboard fetched from the service and absorbs scores
//! saved while offline. Persisted to LocalStorage, tracks top 5 scores.

use serde::{Deserialize, Serialize};

use super::ScoreEntry;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Leaderboard {
    pub entries: Vec<ScoreEntry>,
}

impl Leaderboard {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "fish_frenzy_scores_cache";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Take a fresh copy from the service
    pub fn replace(&mut self, entries: Vec<ScoreEntry>) {
        self.entries = entries;
        self.sort_and_trim();
    }

    /// Fold an offline score in, keeping the best score and level per name
    ///
    /// Returns the name's rank (1-indexed) or None if it fell off the board.
    pub fn merge(&mut self, name: &str, score: u64, level: u32) -> Option<usize> {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => {
                existing.score = existing.score.max(score);
                existing.level = existing.level.max(level);
            }
            None => self.entries.push(ScoreEntry {
                name: name.to_string(),
                score,
                level,
            }),
        }
        self.sort_and_trim();
        self.rank_of(name)
    }

    /// Rank of `name` (1-indexed)
    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name).map(|i| i + 1)
    }

    /// Sorted descending by score, then level
    fn sort_and_trim(&mut self) {
        self.entries
            .sort_by(|a, b| b.score.cmp(&a.score).then(b.level.cmp(&a.level)));
        self.entries.truncate(MAX_HIGH_SCORES);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load the cache from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY)
            && let Ok(scores) = serde_json::from_str::<Leaderboard>(&json)
        {
            log::info!("Loaded {} cached scores", scores.entries.len());
            return scores;
        }

        log::info!("No cached scores found, starting fresh");
        Self::new()
    }

    /// Save the cache to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(json) = serde_json::to_string(self)
        {
            let _ = storage.set_item(Self::STORAGE_KEY, &json);
            log::debug!("Score cache saved ({} entries)", self.entries.len());
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u64, level: u32) -> ScoreEntry {
        ScoreEntry {
            name: name.to_string(),
            score,
            level,
        }
    }

    #[test]
    fn test_merge_keeps_best_per_name() {
        let mut board = Leaderboard::new();
        board.merge("AAA", 300, 5);
        assert_eq!(board.merge("AAA", 200, 7), Some(1));
        assert_eq!(board.entries, vec![entry("AAA", 300, 7)]);
    }

    #[test]
    fn test_merge_orders_and_trims() {
        let mut board = Leaderboard::new();
        board.replace(vec![
            entry("AAA", 500, 3),
            entry("BBB", 400, 3),
            entry("CCC", 300, 3),
            entry("DDD", 200, 3),
            entry("EEE", 100, 3),
        ]);
        assert_eq!(board.merge("FFF", 50, 9), None);
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);

        // Ties on score fall back to level
        assert_eq!(board.merge("GGG", 300, 4), Some(3));
        assert_eq!(board.rank_of("CCC"), Some(4));
        assert_eq!(board.rank_of("EEE"), None);
    }

    #[test]
    fn test_replace_sorts_service_data() {
        let mut board = Leaderboard::new();
        board.replace(vec![entry("LOW", 10, 1), entry("TOP", 90, 2)]);
        assert_eq!(board.top_score(), Some(90));
        assert_eq!(board.rank_of("LOW"), Some(2));
    }
}
