//! Lane and tile state
//!
//! Four lanes, at most one falling tile each. The playfield only moves
//! tiles and reports which ones left the screen; clearing and respawning
//! is left to the match controller.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::{HitWindow, SessionConfig};

/// State of a single lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneState {
    /// Lane holds a falling tile
    pub occupied: bool,
    /// Vertical offset of the tile (negative = above the screen)
    pub fall_position: f32,
}

impl LaneState {
    pub const EMPTY: LaneState = LaneState {
        occupied: false,
        fall_position: EMPTY_POSITION,
    };
}

impl Default for LaneState {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// The four lanes plus the rules that move tiles through them
#[derive(Debug, Clone)]
pub struct Playfield {
    lanes: [LaneState; LANES],
    fall_speed: f32,
    hit_window: HitWindow,
    miss_boundary: f32,
    spawn_position: f32,
    rng: Pcg32,
}

impl Playfield {
    /// Create an empty playfield for a session
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            lanes: [LaneState::EMPTY; LANES],
            fall_speed: config.fall_speed,
            hit_window: config.hit_window,
            miss_boundary: config.miss_boundary,
            spawn_position: config.spawn_position,
            rng: Pcg32::seed_from_u64(config.seed),
        }
    }

    pub fn lanes(&self) -> &[LaneState; LANES] {
        &self.lanes
    }

    pub fn lane(&self, lane: usize) -> Option<&LaneState> {
        self.lanes.get(lane)
    }

    pub fn occupied_count(&self) -> usize {
        self.lanes.iter().filter(|l| l.occupied).count()
    }

    /// Move every active tile down by `fall_speed * delta_ticks`
    pub fn advance(&mut self, delta_ticks: f32) {
        let step = self.fall_speed * delta_ticks;
        for lane in self.lanes.iter_mut().filter(|l| l.occupied) {
            lane.fall_position += step;
        }
    }

    /// Lanes whose tile has fallen completely off the playfield
    pub fn detect_misses(&self) -> Vec<usize> {
        self.lanes
            .iter()
            .enumerate()
            .filter(|(_, l)| l.occupied && l.fall_position >= self.miss_boundary)
            .map(|(i, _)| i)
            .collect()
    }

    /// Spawn a tile in a random free lane.
    ///
    /// Lanes are drawn uniformly from those not yet tried; an occupied or
    /// excluded draw is retried, up to `MAX_SPAWN_ATTEMPTS` draws. Returns
    /// the lane that received the tile, or `None` if the spawn was skipped.
    pub fn spawn_tile(&mut self, exclude_lane: Option<usize>) -> Option<usize> {
        let mut candidates: Vec<usize> = (0..LANES).collect();
        let mut attempts = 0;

        while attempts < MAX_SPAWN_ATTEMPTS && !candidates.is_empty() {
            attempts += 1;
            let pick = self.rng.random_range(0..candidates.len());
            let lane = candidates.swap_remove(pick);
            if Some(lane) == exclude_lane || self.lanes[lane].occupied {
                continue;
            }
            self.place_tile(lane, self.spawn_position);
            return Some(lane);
        }

        log::debug!("Spawn skipped after {} attempts", attempts);
        None
    }

    /// Put a tile into a lane at an explicit position
    pub fn place_tile(&mut self, lane: usize, fall_position: f32) {
        if let Some(state) = self.lanes.get_mut(lane) {
            state.occupied = true;
            state.fall_position = fall_position;
        }
    }

    /// Remove the tile from a lane
    pub fn clear(&mut self, lane: usize) {
        if let Some(state) = self.lanes.get_mut(lane) {
            *state = LaneState::EMPTY;
        }
    }

    pub fn clear_all(&mut self) {
        self.lanes = [LaneState::EMPTY; LANES];
    }

    /// True iff the lane has a tile inside the hit window
    pub fn is_in_hit_window(&self, lane: usize) -> bool {
        self.lanes
            .get(lane)
            .is_some_and(|l| l.occupied && self.hit_window.contains(l.fall_position))
    }
}
