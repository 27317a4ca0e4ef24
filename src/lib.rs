//! Tilefall - a four-lane falling-tile rhythm game core
//!
//! Core modules:
//! - `sim`: Fixed-tick simulation (lanes, judgement, scoring, match controller, demo player)
//! - `track`: Backing-track contract consumed from the audio layer
//! - `persistence`: Per-user last-game and lifetime statistics on disk
//! - `settings`: Player settings and per-session configuration
//! - `user`: Current-user lookup consumed from the login layer

pub mod persistence;
pub mod settings;
pub mod sim;
pub mod track;
pub mod user;

pub use persistence::{LifetimeRecord, LifetimeSummary, SaveReport, StatsError, StatsStore};
pub use settings::{Difficulty, SessionConfig, Settings};
pub use sim::{Match, SessionPhase, SessionResult};

/// Game configuration constants
pub mod consts {
    /// Default tick rate in Hz
    pub const DEFAULT_TICK_RATE: u32 = 120;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the tick driver will try to catch up on (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Number of lanes, one input key each
    pub const LANES: usize = 4;

    /// Board height; an unhit tile at this fall position is missed
    pub const BOARD_HEIGHT: f32 = 780.0;

    /// Fall position of a freshly spawned tile (above the screen)
    pub const SPAWN_POSITION: f32 = -600.0;
    /// Fall position parked in empty lanes
    pub const EMPTY_POSITION: f32 = -9999.0;

    /// Range of fall positions where a key press counts as a hit attempt
    pub const HIT_WINDOW_MIN: f32 = -150.0;
    pub const HIT_WINDOW_MAX: f32 = 900.0;

    /// Fall position of the hit line (ideal press point)
    pub const HIT_LINE: f32 = 550.0;
    /// Distance from the hit line still graded Perfect
    pub const PERFECT_RADIUS: f32 = 50.0;
    /// Distance from the hit line still graded Good
    pub const GOOD_RADIUS: f32 = 100.0;

    /// Misses (fallen tiles plus wrong presses) that end a session
    pub const DEFAULT_MISS_LIMIT: u32 = 10;
    /// Lane draws before a spawn is skipped
    pub const MAX_SPAWN_ATTEMPTS: u32 = 10;

    /// Combo needed for the elevated tier
    pub const ELEVATED_COMBO: u32 = 10;
    /// Combo needed for the peak tier
    pub const PEAK_COMBO: u32 = 25;
    /// Points lost per miss or wrong press
    pub const MISS_PENALTY: i64 = 100;

    /// Combo text pulse on hit, decays back to 1.0
    pub const COMBO_PULSE_PEAK: f32 = 1.5;
    pub const COMBO_PULSE_DECAY: f32 = 0.05;

    /// Track length used when no audio backend is available (seconds)
    pub const FALLBACK_TRACK_SECONDS: f32 = 90.0;
}
