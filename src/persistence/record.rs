//! Typed stats records and their key/value encoding
//!
//! Last game (`last_<user>.properties`):
//! `userId, songIndex, difficulty, hits, misses, errors, score, timeText,
//! accuracyPercent, maxCombo, lastComboCount`
//!
//! Lifetime (`lifetime_<user>.properties`):
//! `lifetime.totalGames|totalHits|totalMisses|totalErrors|totalScore` and
//! `best.<songIndex>.<DIFFICULTY_KEY>.score|accuracyPercent|maxCombo`

use std::collections::BTreeMap;

use serde::Serialize;

use super::kv::KvRecord;
use crate::settings::{Difficulty, normalize_difficulty_key};
use crate::sim::SessionResult;

/// Encode a session result as a last-game record
pub fn last_to_kv(result: &SessionResult) -> KvRecord {
    let mut kv = KvRecord::new();
    kv.set("userId", &result.user_id);
    kv.set("songIndex", result.song_id);
    kv.set("difficulty", result.difficulty.as_str());
    kv.set("hits", result.hits);
    kv.set("misses", result.misses);
    kv.set("errors", result.wrongs);
    kv.set("score", result.score);
    kv.set("timeText", &result.time_text);
    kv.set("accuracyPercent", result.accuracy_percent);
    kv.set("maxCombo", result.max_combo);
    kv.set("lastComboCount", result.final_combo_count);
    kv
}

/// Decode a last-game record. Numbers are lenient; an unknown
/// difficulty makes the record unusable.
pub fn last_from_kv(kv: &KvRecord, user_id: &str) -> Result<SessionResult, String> {
    let difficulty_text = kv.get_or("difficulty", "");
    let difficulty = Difficulty::from_str(&difficulty_text)
        .ok_or_else(|| format!("unknown difficulty {:?}", difficulty_text))?;

    Ok(SessionResult {
        user_id: kv.get_or("userId", user_id),
        song_id: kv.get_u32("songIndex"),
        difficulty,
        hits: kv.get_u32("hits"),
        misses: kv.get_u32("misses"),
        wrongs: kv.get_u32("errors"),
        score: kv.get_i64("score"),
        accuracy_percent: kv.get_f64("accuracyPercent"),
        max_combo: kv.get_u32("maxCombo"),
        final_combo_count: kv.get_u32("lastComboCount"),
        time_text: kv.get_or("timeText", ""),
    })
}

/// Personal-best key: song plus normalized difficulty
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BestKey {
    pub song_id: u32,
    pub difficulty: String,
}

impl BestKey {
    pub fn new(song_id: u32, difficulty: &str) -> Self {
        Self {
            song_id,
            difficulty: normalize_difficulty_key(difficulty),
        }
    }

    fn prefix(&self) -> String {
        format!("best.{}.{}.", self.song_id, self.difficulty)
    }

    /// Split `best.<song>.<difficulty>.<field>` into song, raw difficulty
    /// and field name
    fn parse_field(key: &str) -> Option<(u32, &str, &str)> {
        let rest = key.strip_prefix("best.")?;
        let (song, rest) = rest.split_once('.')?;
        let (difficulty, field) = rest.rsplit_once('.')?;
        let song_id = song.trim().parse().ok()?;
        Some((song_id, difficulty, field))
    }
}

/// Best performance for one song and difficulty
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BestRecord {
    pub score: i64,
    pub accuracy_percent: f64,
    pub max_combo: u32,
}

impl BestRecord {
    pub fn from_result(result: &SessionResult) -> Self {
        Self {
            score: result.score,
            accuracy_percent: result.accuracy_percent,
            max_combo: result.max_combo,
        }
    }

    /// Strictly better: higher score, then higher accuracy, then higher
    /// max combo. A tie on all three is not better.
    pub fn beats(&self, other: &BestRecord) -> bool {
        if self.score != other.score {
            return self.score > other.score;
        }
        if self.accuracy_percent != other.accuracy_percent {
            return self.accuracy_percent > other.accuracy_percent;
        }
        self.max_combo > other.max_combo
    }
}

/// Per-user totals across all finished sessions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LifetimeRecord {
    pub total_games: u64,
    pub total_hits: u64,
    pub total_misses: u64,
    pub total_errors: u64,
    pub total_score: i64,
    pub bests: BTreeMap<BestKey, BestRecord>,
}

impl LifetimeRecord {
    /// Fold one session in. Returns true if it set a new personal best.
    pub fn merge(&mut self, result: &SessionResult) -> bool {
        self.total_games += 1;
        self.total_hits += result.hits as u64;
        self.total_misses += result.misses as u64;
        self.total_errors += result.wrongs as u64;
        self.total_score += result.score;

        let key = BestKey::new(result.song_id, result.difficulty.key());
        if key.difficulty.is_empty() {
            return false;
        }

        let candidate = BestRecord::from_result(result);
        // No previous best ranks below everything
        let improved = self.bests.get(&key).is_none_or(|prev| candidate.beats(prev));
        if improved {
            self.bests.insert(key, candidate);
        }
        improved
    }

    pub fn best(&self, song_id: u32, difficulty: &str) -> Option<&BestRecord> {
        self.bests.get(&BestKey::new(song_id, difficulty))
    }

    /// Lifetime hit percentage; 0.0 before any attempt
    pub fn accuracy_percent(&self) -> f64 {
        let attempts = self.total_hits + self.total_misses + self.total_errors;
        if attempts == 0 {
            return 0.0;
        }
        100.0 * self.total_hits as f64 / attempts as f64
    }

    /// Totals plus the best record for one key (zeros when absent)
    pub fn summary(&self, user_id: &str, song_id: u32, difficulty: &str) -> LifetimeSummary {
        LifetimeSummary {
            user_id: user_id.to_string(),
            total_games: self.total_games,
            total_hits: self.total_hits,
            total_misses: self.total_misses,
            total_errors: self.total_errors,
            total_score: self.total_score,
            lifetime_accuracy_percent: self.accuracy_percent(),
            song_id,
            difficulty: normalize_difficulty_key(difficulty),
            best: self.best(song_id, difficulty).copied().unwrap_or_default(),
        }
    }

    pub fn to_kv(&self) -> KvRecord {
        let mut kv = KvRecord::new();
        kv.set("lifetime.totalGames", self.total_games);
        kv.set("lifetime.totalHits", self.total_hits);
        kv.set("lifetime.totalMisses", self.total_misses);
        kv.set("lifetime.totalErrors", self.total_errors);
        kv.set("lifetime.totalScore", self.total_score);

        for (key, best) in &self.bests {
            let prefix = key.prefix();
            kv.set(&format!("{prefix}score"), best.score);
            kv.set(&format!("{prefix}accuracyPercent"), best.accuracy_percent);
            kv.set(&format!("{prefix}maxCombo"), best.max_combo);
        }
        kv
    }

    pub fn from_kv(kv: &KvRecord) -> Self {
        let mut record = Self {
            total_games: kv.get_u64("lifetime.totalGames"),
            total_hits: kv.get_u64("lifetime.totalHits"),
            total_misses: kv.get_u64("lifetime.totalMisses"),
            total_errors: kv.get_u64("lifetime.totalErrors"),
            total_score: kv.get_i64("lifetime.totalScore"),
            bests: BTreeMap::new(),
        };

        // Group by the spelling found in the file first; several spellings
        // of one difficulty collapse to one key below
        let mut raw: BTreeMap<(u32, String), BestRecord> = BTreeMap::new();
        for raw_key in kv.keys() {
            let Some((song_id, difficulty, field)) = BestKey::parse_field(&raw_key) else {
                continue;
            };
            let best = raw.entry((song_id, difficulty.to_string())).or_default();
            match field {
                "score" => best.score = kv.get_i64(&raw_key),
                "accuracyPercent" => best.accuracy_percent = kv.get_f64(&raw_key),
                "maxCombo" => best.max_combo = kv.get_u32(&raw_key),
                other => log::debug!("Ignoring unknown best field {:?}", other),
            }
        }

        for ((song_id, difficulty), best) in raw {
            let key = BestKey::new(song_id, &difficulty);
            if key.difficulty.is_empty() {
                continue;
            }
            if record.bests.get(&key).is_none_or(|kept| best.beats(kept)) {
                record.bests.insert(key, best);
            }
        }
        record
    }
}

/// Lifetime view for one song and difficulty
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifetimeSummary {
    pub user_id: String,
    pub total_games: u64,
    pub total_hits: u64,
    pub total_misses: u64,
    pub total_errors: u64,
    pub total_score: i64,
    pub lifetime_accuracy_percent: f64,
    pub song_id: u32,
    /// Normalized difficulty key
    pub difficulty: String,
    pub best: BestRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: i64, accuracy: f64, max_combo: u32) -> SessionResult {
        SessionResult {
            user_id: "alice".into(),
            song_id: 1,
            difficulty: Difficulty::Medium,
            hits: 10,
            misses: 2,
            wrongs: 1,
            score,
            accuracy_percent: accuracy,
            max_combo,
            final_combo_count: 3,
            time_text: "2025-12-06 18:32".into(),
        }
    }

    fn best_after(seed: (i64, f64, u32), next: (i64, f64, u32)) -> BestRecord {
        let mut record = LifetimeRecord::default();
        record.merge(&result(seed.0, seed.1, seed.2));
        record.merge(&result(next.0, next.1, next.2));
        *record.best(1, "MEDIUM").unwrap()
    }

    #[test]
    fn test_tie_break_combo_improves() {
        let best = best_after((1000, 90.0, 20), (1000, 90.0, 25));
        assert_eq!(best.max_combo, 25);
    }

    #[test]
    fn test_tie_break_accuracy_regresses() {
        let best = best_after((1000, 90.0, 20), (1000, 85.0, 30));
        assert_eq!(best, BestRecord { score: 1000, accuracy_percent: 90.0, max_combo: 20 });
    }

    #[test]
    fn test_tie_break_order() {
        // Higher score wins even with worse accuracy and combo
        assert_eq!(best_after((1000, 90.0, 20), (1001, 10.0, 1)).score, 1001);
        // Lower score never wins
        assert_eq!(best_after((1000, 90.0, 20), (999, 100.0, 99)).score, 1000);
        // Equal score, better accuracy wins with worse combo
        assert_eq!(best_after((1000, 90.0, 20), (1000, 95.0, 1)).max_combo, 1);
        // Full tie keeps the record
        let mut record = LifetimeRecord::default();
        assert!(record.merge(&result(1000, 90.0, 20)));
        assert!(!record.merge(&result(1000, 90.0, 20)));
    }

    #[test]
    fn test_first_result_always_best() {
        let mut record = LifetimeRecord::default();
        assert!(record.merge(&result(-500, 0.0, 0)));
        assert_eq!(record.best(1, "medium").unwrap().score, -500);
    }

    #[test]
    fn test_totals_accumulate_every_merge() {
        let mut record = LifetimeRecord::default();
        record.merge(&result(100, 50.0, 2));
        record.merge(&result(-50, 40.0, 1));
        assert_eq!(record.total_games, 2);
        assert_eq!(record.total_hits, 20);
        assert_eq!(record.total_misses, 4);
        assert_eq!(record.total_errors, 2);
        assert_eq!(record.total_score, 50);
    }

    #[test]
    fn test_lifetime_kv_round_trip() {
        let mut record = LifetimeRecord::default();
        record.merge(&result(1000, 66.66666666666667, 20));
        let mut other = result(300, 100.0, 1);
        other.song_id = 7;
        other.difficulty = Difficulty::VeryEasy;
        record.merge(&other);

        let kv = record.to_kv();
        assert_eq!(kv.get_i64("best.7.VERY_EASY.score"), 300);
        assert_eq!(LifetimeRecord::from_kv(&kv), record);
    }

    #[test]
    fn test_best_keys_normalized_on_read() {
        let kv = KvRecord::parse(
            "lifetime.totalGames=3\n\
             best.2.very easy.score=900\n\
             best.2.very easy.maxCombo=12\n\
             best.x.EASY.score=1\n\
             best.2.HARD\n",
        )
        .unwrap();
        let record = LifetimeRecord::from_kv(&kv);
        assert_eq!(record.total_games, 3);
        assert_eq!(record.bests.len(), 1);
        let best = record.best(2, "VERY_EASY").unwrap();
        assert_eq!(best.score, 900);
        assert_eq!(best.max_combo, 12);
        assert_eq!(best.accuracy_percent, 0.0);
    }

    #[test]
    fn test_duplicate_best_spellings_keep_higher() {
        let kv = KvRecord::parse(
            "best.2.very easy.score=900\n\
             best.2.very easy.maxCombo=12\n\
             best.2.VERY_EASY.score=1200\n\
             best.2.VERY_EASY.maxCombo=3\n\
             best.2. Very  Easy .score=100\n",
        )
        .unwrap();
        let record = LifetimeRecord::from_kv(&kv);
        assert_eq!(record.bests.len(), 1);
        let best = record.best(2, "VERY_EASY").unwrap();
        assert_eq!(best.score, 1200);
        assert_eq!(best.max_combo, 3);
    }

    #[test]
    fn test_summary_defaults_best_to_zero() {
        let mut record = LifetimeRecord::default();
        let mut r = result(500, 80.0, 8);
        r.hits = 8;
        r.misses = 2;
        r.wrongs = 0;
        record.merge(&r);

        let summary = record.summary("alice", 9, "hard");
        assert_eq!(summary.lifetime_accuracy_percent, 80.0);
        assert_eq!(summary.difficulty, "HARD");
        assert_eq!(summary.best, BestRecord::default());

        let summary = record.summary("alice", 1, "Medium");
        assert_eq!(summary.best.score, 500);
    }

    #[test]
    fn test_empty_lifetime_accuracy_is_zero() {
        assert_eq!(LifetimeRecord::default().accuracy_percent(), 0.0);
    }

    #[test]
    fn test_last_kv_round_trip() {
        let saved = result(-120, 33.333333333333336, 4);
        let kv = last_to_kv(&saved);
        assert_eq!(kv.get_or("difficulty", ""), "MEDIUM");
        assert_eq!(last_from_kv(&kv, "ignored").unwrap(), saved);
    }

    #[test]
    fn test_last_unknown_difficulty_rejected() {
        let kv = KvRecord::parse("userId=bob\ndifficulty=IMPOSSIBLE\n").unwrap();
        assert!(last_from_kv(&kv, "bob").is_err());
    }

    #[test]
    fn test_last_lenient_fields() {
        let kv = KvRecord::parse("difficulty=very easy\nhits=abc\nscore=-40\n").unwrap();
        let last = last_from_kv(&kv, "carol").unwrap();
        assert_eq!(last.user_id, "carol");
        assert_eq!(last.difficulty, Difficulty::VeryEasy);
        assert_eq!(last.hits, 0);
        assert_eq!(last.score, -40);
        assert_eq!(last.time_text, "");
    }
}
