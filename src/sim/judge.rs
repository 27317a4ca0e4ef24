//! Hit judgement
//!
//! Decides whether a key press lands on a tile and grades it. Pure: the
//! caller applies the score change and clears the lane.

use serde::{Deserialize, Serialize};

use super::lanes::Playfield;
use crate::settings::SessionConfig;

/// Hit grade, best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitQuality {
    Perfect,
    Good,
    Ok,
}

impl HitQuality {
    /// Map a caller-supplied grade (0 = perfect, 1 = good, anything else = ok)
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => HitQuality::Perfect,
            1 => HitQuality::Good,
            _ => HitQuality::Ok,
        }
    }

    /// Grade by distance from the hit line
    pub fn from_distance(distance: f32, config: &SessionConfig) -> Self {
        let distance = distance.abs();
        if distance <= config.perfect_radius {
            HitQuality::Perfect
        } else if distance <= config.good_radius {
            HitQuality::Good
        } else {
            HitQuality::Ok
        }
    }

    /// Base points before the combo multiplier
    pub fn points(&self) -> i64 {
        match self {
            HitQuality::Perfect => 300,
            HitQuality::Good => 150,
            HitQuality::Ok => 100,
        }
    }

    /// Feedback text shown on hit
    pub fn label(&self) -> &'static str {
        match self {
            HitQuality::Perfect => "Perfect!!",
            HitQuality::Good => "Great!",
            HitQuality::Ok => "Ok",
        }
    }
}

/// Outcome of a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Judgement {
    Hit(HitQuality),
    /// Empty lane, or tile outside the hit window
    Wrong,
}

/// Judge a press on `lane`.
///
/// `press_offset_ticks` is how far past the last tick the press happened
/// (fraction of a tick from the tick driver, or 0). The hit window is
/// checked against the tile's simulated position; the grade uses the
/// position extrapolated to the press.
pub fn judge(field: &Playfield, config: &SessionConfig, lane: usize, press_offset_ticks: f32) -> Judgement {
    if !field.is_in_hit_window(lane) {
        return Judgement::Wrong;
    }
    let Some(state) = field.lane(lane) else {
        return Judgement::Wrong;
    };

    let press_position = state.fall_position + config.fall_speed * press_offset_ticks;
    let quality = HitQuality::from_distance(press_position - config.ideal_position, config);
    Judgement::Hit(quality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::Difficulty;

    fn setup() -> (Playfield, SessionConfig) {
        let config = SessionConfig::new(Difficulty::Medium, 1);
        (Playfield::new(&config), config)
    }

    #[test]
    fn test_empty_lane_is_wrong() {
        let (field, config) = setup();
        assert_eq!(judge(&field, &config, 0, 0.0), Judgement::Wrong);
        assert_eq!(judge(&field, &config, 9, 0.0), Judgement::Wrong);
    }

    #[test]
    fn test_outside_window_is_wrong() {
        let (mut field, config) = setup();
        field.place_tile(1, SPAWN_POSITION);
        assert_eq!(judge(&field, &config, 1, 0.0), Judgement::Wrong);
    }

    #[test]
    fn test_quality_by_distance_from_hit_line() {
        let (mut field, config) = setup();

        field.place_tile(2, HIT_LINE + 10.0);
        assert_eq!(judge(&field, &config, 2, 0.0), Judgement::Hit(HitQuality::Perfect));

        field.place_tile(2, HIT_LINE - 80.0);
        assert_eq!(judge(&field, &config, 2, 0.0), Judgement::Hit(HitQuality::Good));

        field.place_tile(2, 0.0);
        assert_eq!(judge(&field, &config, 2, 0.0), Judgement::Hit(HitQuality::Ok));
    }

    #[test]
    fn test_press_offset_extrapolates_position() {
        let (mut field, config) = setup();
        // 60 short of Perfect; half a tick at speed 3 doesn't get there, 4 ticks does
        field.place_tile(0, HIT_LINE - PERFECT_RADIUS - 10.0);
        assert_eq!(judge(&field, &config, 0, 0.5), Judgement::Hit(HitQuality::Good));
        assert_eq!(judge(&field, &config, 0, 4.0), Judgement::Hit(HitQuality::Perfect));
    }

    #[test]
    fn test_from_index_mapping() {
        assert_eq!(HitQuality::from_index(0).points(), 300);
        assert_eq!(HitQuality::from_index(1).points(), 150);
        assert_eq!(HitQuality::from_index(2).points(), 100);
        assert_eq!(HitQuality::from_index(7), HitQuality::Ok);
    }

    #[test]
    fn test_labels() {
        assert_eq!(HitQuality::Perfect.label(), "Perfect!!");
        assert_eq!(HitQuality::Good.label(), "Great!");
        assert_eq!(HitQuality::Ok.label(), "Ok");
    }
}
