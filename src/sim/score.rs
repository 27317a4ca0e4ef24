//! Score and combo state machine

use serde::{Deserialize, Serialize};

use super::judge::HitQuality;
use crate::consts::*;

/// Combo-derived tile tier (drives tile colour on the render side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Normal,
    /// combo >= 10
    Elevated,
    /// combo >= 25
    Peak,
}

impl Tier {
    pub fn from_combo(combo: u32) -> Self {
        if combo >= PEAK_COMBO {
            Tier::Peak
        } else if combo >= ELEVATED_COMBO {
            Tier::Elevated
        } else {
            Tier::Normal
        }
    }
}

/// Running score for one session.
///
/// Only mutated through `register_*`; the tier is always computed from the
/// current combo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    score: i64,
    combo_count: u32,
    max_combo: u32,
    hits: u32,
    /// Fallen tiles plus wrong presses
    misses: u32,
    wrongs: u32,
}

impl ScoreState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn combo_count(&self) -> u32 {
        self.combo_count
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    /// Unified miss count (fallen tiles and wrong presses)
    pub fn misses(&self) -> u32 {
        self.misses
    }

    /// Wrong presses only
    pub fn wrongs(&self) -> u32 {
        self.wrongs
    }

    pub fn tier(&self) -> Tier {
        Tier::from_combo(self.combo_count)
    }

    /// Successful hit; the combo multiplies the base points linearly
    pub fn register_hit(&mut self, quality: HitQuality) {
        let points = quality.points();
        self.score += points + self.combo_count as i64 * points;
        self.hits += 1;
        self.combo_count += 1;
        self.max_combo = self.max_combo.max(self.combo_count);
    }

    /// Tile fell off the playfield
    pub fn register_miss(&mut self) {
        self.misses += 1;
        self.break_combo();
    }

    /// Key pressed with nothing to hit
    pub fn register_wrong(&mut self) {
        self.misses += 1;
        self.wrongs += 1;
        self.break_combo();
    }

    fn break_combo(&mut self) {
        self.score -= MISS_PENALTY;
        self.combo_count = 0;
    }

    /// Hit percentage; 100.0 before any attempt
    pub fn accuracy(&self) -> f64 {
        let total = self.hits + self.misses + self.wrongs;
        if total == 0 {
            return 100.0;
        }
        self.hits as f64 * 100.0 / total as f64
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_accuracy_without_attempts() {
        assert_eq!(ScoreState::new().accuracy(), 100.0);
    }

    #[test]
    fn test_quality_points_with_combo() {
        let mut s = ScoreState::new();
        s.register_hit(HitQuality::Good);
        s.register_hit(HitQuality::Ok);
        // 150 + (100 + 1 * 100)
        assert_eq!(s.score(), 350);
        assert_eq!(s.combo_count(), 2);
    }

    #[test]
    fn test_miss_penalty_can_go_negative() {
        let mut s = ScoreState::new();
        s.register_miss();
        s.register_wrong();
        assert_eq!(s.score(), -200);
        assert_eq!(s.misses(), 2);
        assert_eq!(s.wrongs(), 1);
    }

    #[test]
    fn test_miss_from_peak_resets_to_normal() {
        let mut s = ScoreState::new();
        for _ in 0..30 {
            s.register_hit(HitQuality::Perfect);
        }
        assert_eq!(s.tier(), Tier::Peak);

        s.register_miss();
        assert_eq!(s.combo_count(), 0);
        assert_eq!(s.tier(), Tier::Normal);
        assert_eq!(s.max_combo(), 30);
    }

    #[test]
    fn test_accuracy_counts_wrongs_in_both_terms() {
        let mut s = ScoreState::new();
        for _ in 0..8 {
            s.register_hit(HitQuality::Ok);
        }
        s.register_miss();
        s.register_miss();
        assert_eq!(s.accuracy(), 80.0);

        s.register_wrong();
        // 8 / (8 + 3 + 1)
        assert!((s.accuracy() - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_tier_bands() {
        assert_eq!(Tier::from_combo(0), Tier::Normal);
        assert_eq!(Tier::from_combo(9), Tier::Normal);
        assert_eq!(Tier::from_combo(10), Tier::Elevated);
        assert_eq!(Tier::from_combo(24), Tier::Elevated);
        assert_eq!(Tier::from_combo(25), Tier::Peak);
        assert_eq!(Tier::from_combo(1000), Tier::Peak);
    }

    #[test]
    fn test_reset() {
        let mut s = ScoreState::new();
        s.register_hit(HitQuality::Perfect);
        s.register_wrong();
        s.reset();
        assert_eq!(s, ScoreState::new());
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Hit(u8),
        Miss,
        Wrong,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0u8..3).prop_map(Op::Hit),
            1 => Just(Op::Miss),
            1 => Just(Op::Wrong),
        ]
    }

    proptest! {
        /// N perfect hits in a row score sum(300 * (1 + i))
        #[test]
        fn prop_perfect_run_score(n in 0u32..200) {
            let mut s = ScoreState::new();
            for _ in 0..n {
                s.register_hit(HitQuality::Perfect);
            }
            let expected: i64 = (0..n as i64).map(|i| 300 * (1 + i)).sum();
            prop_assert_eq!(s.score(), expected);
            prop_assert_eq!(s.max_combo(), n);
        }

        /// Combo never exceeds max combo, and breaks always reset it
        #[test]
        fn prop_combo_invariants(ops in prop::collection::vec(op(), 0..300)) {
            let mut s = ScoreState::new();
            for op in ops {
                match op {
                    Op::Hit(q) => s.register_hit(HitQuality::from_index(q)),
                    Op::Miss => {
                        s.register_miss();
                        prop_assert_eq!(s.combo_count(), 0);
                        prop_assert_eq!(s.tier(), Tier::Normal);
                    }
                    Op::Wrong => {
                        s.register_wrong();
                        prop_assert_eq!(s.combo_count(), 0);
                    }
                }
                prop_assert!(s.combo_count() <= s.max_combo());
                prop_assert!(s.wrongs() <= s.misses());
                prop_assert!(s.accuracy() >= 0.0 && s.accuracy() <= 100.0);
            }
        }

        /// Within a combo run the tier never drops, and Peak is never
        /// reached without passing through Elevated
        #[test]
        fn prop_tier_monotonic_in_run(n in 1u32..60) {
            let mut s = ScoreState::new();
            let mut prev = s.tier();
            let mut seen_elevated = false;
            for _ in 0..n {
                s.register_hit(HitQuality::Ok);
                let tier = s.tier();
                prop_assert!(tier >= prev);
                if tier == Tier::Elevated {
                    seen_elevated = true;
                }
                if tier == Tier::Peak {
                    prop_assert!(seen_elevated);
                }
                prev = tier;
            }
        }
    }
}
