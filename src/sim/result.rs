//! End-of-session snapshot

use serde::{Deserialize, Serialize};

use super::score::ScoreState;
use crate::settings::{Difficulty, SessionConfig};

/// Timestamp format of `SessionResult::time_text`
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Immutable result of a finished (won or lost) session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub user_id: String,
    pub song_id: u32,
    pub difficulty: Difficulty,
    pub hits: u32,
    /// Fallen tiles plus wrong presses
    pub misses: u32,
    pub wrongs: u32,
    pub score: i64,
    pub accuracy_percent: f64,
    pub max_combo: u32,
    /// Combo still running when the session ended
    pub final_combo_count: u32,
    /// Local time the session ended, `yyyy-MM-dd HH:mm`
    pub time_text: String,
}

impl SessionResult {
    /// Snapshot a score, stamped with the current local time
    pub fn from_score(user_id: &str, config: &SessionConfig, score: &ScoreState) -> Self {
        Self::from_score_at(user_id, config, score, now_text())
    }

    pub fn from_score_at(
        user_id: &str,
        config: &SessionConfig,
        score: &ScoreState,
        time_text: String,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            song_id: config.song_id,
            difficulty: config.difficulty,
            hits: score.hits(),
            misses: score.misses(),
            wrongs: score.wrongs(),
            score: score.score(),
            accuracy_percent: score.accuracy(),
            max_combo: score.max_combo(),
            final_combo_count: score.combo_count(),
            time_text,
        }
    }
}

/// Current local time in `TIME_FORMAT`
pub fn now_text() -> String {
    chrono::Local::now().format(TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::judge::HitQuality;

    #[test]
    fn test_snapshot_copies_score() {
        let config = SessionConfig::new(Difficulty::Easy, 4);
        let mut score = ScoreState::new();
        score.register_hit(HitQuality::Perfect);
        score.register_hit(HitQuality::Perfect);
        score.register_wrong();
        score.register_hit(HitQuality::Good);

        let result = SessionResult::from_score_at("bob", &config, &score, "2025-12-06 18:32".into());
        assert_eq!(result.user_id, "bob");
        assert_eq!(result.song_id, 4);
        assert_eq!(result.difficulty, Difficulty::Easy);
        assert_eq!(result.hits, 3);
        assert_eq!(result.misses, 1);
        assert_eq!(result.wrongs, 1);
        assert_eq!(result.score, 300 + 600 - 100 + 150);
        assert_eq!(result.max_combo, 2);
        assert_eq!(result.final_combo_count, 1);
        assert_eq!(result.accuracy_percent, 60.0);
    }

    #[test]
    fn test_time_text_shape() {
        let text = now_text();
        assert_eq!(text.len(), 16);
        assert!(chrono::NaiveDateTime::parse_from_str(&text, TIME_FORMAT).is_ok());
    }
}
