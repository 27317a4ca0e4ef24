//! Demo player
//!
//! Plays a match through the same key-press API a human would use.
//! `skill` in 0..=1 sets how tightly presses cluster on the hit line,
//! how often tiles are ignored and how often a stray key is hit.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::session::Match;
use crate::consts::*;

/// Press spread around the hit line at skill 1.0 and 0.0
const MIN_SPREAD: f32 = 20.0;
const MAX_SPREAD: f32 = 300.0;
/// Chance to let a tile fall at skill 0.0
const MAX_SKIP_CHANCE: f64 = 0.3;
/// Per-tick chance of a stray key press at skill 0.0
const MAX_STRAY_CHANCE: f64 = 0.004;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Plan {
    /// Press once the tile reaches this fall position
    Press(f32),
    Skip,
    Done,
}

pub struct Autoplay {
    rng: Pcg32,
    skill: f32,
    plans: [Option<Plan>; LANES],
    last_seen: [f32; LANES],
}

impl Autoplay {
    pub fn new(seed: u64, skill: f32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            skill: skill.clamp(0.0, 1.0),
            plans: [None; LANES],
            last_seen: [EMPTY_POSITION; LANES],
        }
    }

    pub fn skill(&self) -> f32 {
        self.skill
    }

    /// Look at the board after a tick and press whatever is due.
    /// Returns the number of key presses made.
    pub fn act(&mut self, session: &mut Match) -> u32 {
        if !session.phase().is_running() {
            return 0;
        }

        let mut presses = 0;
        let lanes = *session.field().lanes();

        for (lane, state) in lanes.iter().enumerate() {
            if !state.occupied {
                self.plans[lane] = None;
                self.last_seen[lane] = EMPTY_POSITION;
                continue;
            }

            // Position went backwards: a fresh tile respawned in this lane
            if state.fall_position < self.last_seen[lane] {
                self.plans[lane] = None;
            }
            self.last_seen[lane] = state.fall_position;

            let plan = match self.plans[lane] {
                Some(plan) => plan,
                None => {
                    let plan = self.plan_tile(session.config().ideal_position);
                    self.plans[lane] = Some(plan);
                    plan
                }
            };

            if let Plan::Press(target) = plan
                && state.fall_position >= target
            {
                self.press(session, lane);
                self.plans[lane] = Some(Plan::Done);
                presses += 1;
            }
        }

        let stray_chance = MAX_STRAY_CHANCE * (1.0 - self.skill as f64);
        if stray_chance > 0.0 && self.rng.random_bool(stray_chance) {
            let lane = self.rng.random_range(0..LANES);
            self.press(session, lane);
            presses += 1;
        }

        presses
    }

    fn plan_tile(&mut self, hit_line: f32) -> Plan {
        let sloppiness = 1.0 - self.skill;
        if self.rng.random_bool(MAX_SKIP_CHANCE * sloppiness as f64) {
            return Plan::Skip;
        }
        let spread = MIN_SPREAD + (MAX_SPREAD - MIN_SPREAD) * sloppiness;
        Plan::Press(hit_line + self.rng.random_range(-spread..=spread))
    }

    fn press(&self, session: &mut Match, lane: usize) {
        session.on_key_down(lane);
        session.on_key_up(lane);
    }
}
