//! Survival leaderboard
//!
//! Best ten runs, highest score first, persisted to LocalStorage. A score is
//! whole seconds survived, so a run that dies immediately still scores 0 and
//! is recorded while the board has room.

use serde::{Deserialize, Serialize};

/// Maximum number of runs kept
pub const MAX_HIGH_SCORES: usize = 10;

/// One finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Spawn seed, so a run can be replayed
    #[serde(default)]
    pub seed: u64,
    /// Unix timestamp (ms)
    pub timestamp: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "dodge_spike_highscores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Rank `score` would get (1-indexed). Ties rank below existing entries.
    pub fn rank_for(&self, score: u64) -> Option<usize> {
        let rank = self.entries.iter().take_while(|e| e.score >= score).count() + 1;
        (rank <= MAX_HIGH_SCORES).then_some(rank)
    }

    pub fn qualifies(&self, score: u64) -> bool {
        self.rank_for(score).is_some()
    }

    /// Insert a run; returns its rank, or `None` if it did not make the board
    pub fn record(&mut self, score: u64, seed: u64, timestamp: f64) -> Option<usize> {
        let rank = self.rank_for(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                seed,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        log::info!("High score {} at rank {}", score, rank);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(Ok(Some(json))) = storage.map(|s| s.get_item(Self::STORAGE_KEY)) {
            match serde_json::from_str::<HighScores>(&json) {
                Ok(mut scores) => {
                    scores.normalize();
                    log::info!("Loaded {} high scores", scores.entries.len());
                    return scores;
                }
                Err(e) => log::warn!("Discarding malformed high scores: {}", e),
            }
        }

        Self::new()
    }

    /// Save to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let Some(storage) = storage else {
            log::warn!("LocalStorage unavailable, high scores not saved");
            return;
        };
        match serde_json::to_string(self) {
            Ok(json) => {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Failed to write high scores");
                }
            }
            Err(e) => log::warn!("Failed to encode high scores: {}", e),
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}

    /// Re-sort and trim data loaded from outside
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    fn normalize(&mut self) {
        // Stable sort keeps insertion order among ties
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_score_recorded_when_room() {
        let mut scores = HighScores::new();
        assert_eq!(scores.record(0, 1, 0.0), Some(1));
        assert_eq!(scores.best(), Some(0));
    }

    #[test]
    fn test_sorted_descending_ties_after() {
        let mut scores = HighScores::new();
        scores.record(10, 1, 1.0);
        scores.record(30, 2, 2.0);
        assert_eq!(scores.record(10, 3, 3.0), Some(3));

        let order: Vec<_> = scores.entries.iter().map(|e| (e.score, e.seed)).collect();
        assert_eq!(order, vec![(30, 2), (10, 1), (10, 3)]);
    }

    #[test]
    fn test_full_board() {
        let mut scores = HighScores::new();
        for s in 1..=MAX_HIGH_SCORES as u64 {
            scores.record(s * 10, s, 0.0);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(10));
        assert!(!scores.qualifies(5));
        assert_eq!(scores.record(5, 0, 0.0), None);

        assert_eq!(scores.record(55, 0, 0.0), Some(6));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(20));
    }

    #[test]
    fn test_normalize_unsorted_input() {
        let json = r#"{"entries":[{"score":3,"timestamp":0.0},{"score":9,"timestamp":0.0}]}"#;
        let mut scores: HighScores = serde_json::from_str(json).unwrap();
        scores.normalize();
        assert_eq!(scores.best(), Some(9));
        assert_eq!(scores.entries[1].seed, 0);
    }
}
