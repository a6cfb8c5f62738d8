//! High score leaderboard
//!
//! A ledger keeps the top 10 entries, sorted descending by score. Equal
//! scores keep insertion order. Loading and saving happen through
//! `persistence::ScoreStore`; this module never touches storage.

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Player name, at most 17 characters
    pub name: String,
    pub score: u64,
    /// Correct keys typed during the run
    #[serde(default)]
    pub letters: u32,
    /// Average reaction time in seconds (two decimals)
    #[serde(default)]
    pub avg_time: f32,
    /// Difficulty tag for climb runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl ScoreEntry {
    pub fn new(name: &str, score: u64) -> Self {
        Self {
            name: crate::sanitize_name(name),
            score,
            letters: 0,
            avg_time: 0.0,
            difficulty: None,
        }
    }
}

/// Ranked top-10 ledger
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ScoreLedger {
    entries: Vec<ScoreEntry>,
}

impl ScoreLedger {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a ledger from stored entries in any order
    ///
    /// Zero scores are dropped, the rest ranked and truncated.
    pub fn from_entries(mut entries: Vec<ScoreEntry>) -> Self {
        entries.retain(|e| e.score > 0);
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add an entry if it makes the board; returns the ranked ledger
    pub fn record(&mut self, entry: ScoreEntry) -> &[ScoreEntry] {
        if !self.qualifies(entry.score) {
            return &self.entries;
        }

        // Find insertion point (sorted descending, after equal scores)
        match self.entries.iter().position(|e| entry.score > e.score) {
            Some(i) => self.entries.insert(i, entry),
            None => self.entries.push(entry),
        }

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);
        &self.entries
    }

    /// Fold another ledger's entries in, skipping exact duplicates
    pub fn merge<I: IntoIterator<Item = ScoreEntry>>(&mut self, entries: I) {
        for entry in entries {
            if !self.entries.contains(&entry) {
                self.record(entry);
            }
        }
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Plain-text ranking table
    pub fn table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<5} {:<17} {:>7} {:>8} {:>9} {:<7}\n",
            "Rank", "Player", "Score", "Letters", "Avg (s)", "Tier"
        ));
        for (i, e) in self.entries.iter().enumerate() {
            out.push_str(&format!(
                "{:<5} {:<17} {:>7} {:>8} {:>9.2} {:<7}\n",
                i + 1,
                e.name,
                e.score,
                e.letters,
                e.avg_time,
                e.difficulty.as_deref().unwrap_or("-")
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(name: &str, score: u64) -> ScoreEntry {
        ScoreEntry::new(name, score)
    }

    fn full_ledger() -> ScoreLedger {
        let mut ledger = ScoreLedger::new();
        for i in 0..10 {
            ledger.record(entry(&format!("p{i}"), 50 + i * 10));
        }
        ledger
    }

    #[test]
    fn test_zero_never_recorded() {
        let mut ledger = ScoreLedger::new();
        ledger.record(entry("a", 0));
        assert!(ledger.is_empty());
        assert_eq!(ledger.potential_rank(0), None);
    }

    #[test]
    fn test_sorted_descending() {
        let mut ledger = ScoreLedger::new();
        ledger.record(entry("a", 100));
        ledger.record(entry("b", 300));
        ledger.record(entry("c", 200));
        let scores: Vec<u64> = ledger.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 200, 100]);
        assert_eq!(ledger.top_score(), Some(300));
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut ledger = ScoreLedger::new();
        ledger.record(entry("first", 100));
        ledger.record(entry("second", 100));
        ledger.record(entry("third", 100));
        let names: Vec<&str> = ledger.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_low_score_excluded_from_full_board() {
        let mut ledger = full_ledger();
        assert_eq!(ledger.entries().last().map(|e| e.score), Some(50));
        let before = ledger.clone();
        assert_eq!(ledger.potential_rank(30), None);
        ledger.record(entry("late", 30));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_high_score_evicts_lowest() {
        let mut ledger = full_ledger();
        assert_eq!(ledger.potential_rank(1000), Some(1));
        ledger.record(entry("champ", 1000));
        assert_eq!(ledger.len(), MAX_HIGH_SCORES);
        assert_eq!(ledger.entries()[0].name, "champ");
        assert_eq!(ledger.entries().last().map(|e| e.score), Some(60));
    }

    #[test]
    fn test_from_entries_normalizes() {
        let entries = (0..15).map(|i| entry("x", i)).collect();
        let ledger = ScoreLedger::from_entries(entries);
        assert_eq!(ledger.len(), 10);
        assert_eq!(ledger.top_score(), Some(14));
        assert_eq!(ledger.entries().last().map(|e| e.score), Some(5));
    }

    #[test]
    fn test_merge_skips_duplicates() {
        let mut ledger = ScoreLedger::new();
        ledger.record(entry("a", 10));
        ledger.merge(vec![entry("a", 10), entry("b", 20)]);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.entries()[0].name, "b");
    }

    #[test]
    fn test_table_lists_every_entry() {
        let ledger = full_ledger();
        let table = ledger.table();
        assert_eq!(table.lines().count(), 11);
        assert!(table.contains("p9"));
    }

    proptest! {
        #[test]
        fn prop_ledger_sorted_and_bounded(scores in proptest::collection::vec(0u64..1000, 0..60)) {
            let mut ledger = ScoreLedger::new();
            for (i, score) in scores.iter().enumerate() {
                let ranked = ledger.record(entry(&format!("p{i}"), *score));
                prop_assert!(ranked.len() <= MAX_HIGH_SCORES);
                prop_assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
            }
            let mut expected: Vec<u64> = scores.iter().copied().filter(|s| *s > 0).collect();
            expected.sort_by(|a, b| b.cmp(a));
            expected.truncate(MAX_HIGH_SCORES);
            let got: Vec<u64> = ledger.entries().iter().map(|e| e.score).collect();
            prop_assert_eq!(got, expected);
        }
    }
}
