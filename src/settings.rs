//! Game settings and per-session configuration
//!
//! `Settings` are the player's persisted preferences (JSON on disk).
//! `SessionConfig` is derived from them when a match is created and stays
//! fixed for the lifetime of that match.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Difficulty levels, slowest to fastest fall speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    VeryEasy,
    Easy,
    #[default]
    Medium,
    Hard,
    VeryHard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::VeryEasy,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::VeryHard,
    ];

    /// Display label
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::VeryEasy => "VERY EASY",
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
            Difficulty::VeryHard => "VERY HARD",
        }
    }

    /// Normalized key used in persisted best-record fields
    pub fn key(&self) -> &'static str {
        match self {
            Difficulty::VeryEasy => "VERY_EASY",
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
            Difficulty::VeryHard => "VERY_HARD",
        }
    }

    /// Parse a label or key ("very easy", "VERY_EASY", " Very  Easy ")
    pub fn from_str(s: &str) -> Option<Self> {
        match normalize_difficulty_key(s).as_str() {
            "VERY_EASY" => Some(Difficulty::VeryEasy),
            "EASY" => Some(Difficulty::Easy),
            "MEDIUM" | "MED" => Some(Difficulty::Medium),
            "HARD" => Some(Difficulty::Hard),
            "VERY_HARD" => Some(Difficulty::VeryHard),
            _ => None,
        }
    }

    /// Tile fall speed in position units per tick
    pub fn fall_speed(&self) -> f32 {
        match self {
            Difficulty::VeryEasy => 1.0,
            Difficulty::Easy => 2.0,
            Difficulty::Medium => 3.0,
            Difficulty::Hard => 4.0,
            Difficulty::VeryHard => 5.0,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim, collapse whitespace runs to `_`, upper-case.
pub fn normalize_difficulty_key(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}

/// Inclusive range of fall positions accepted as a hit attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitWindow {
    pub min: f32,
    pub max: f32,
}

impl HitWindow {
    pub fn contains(&self, position: f32) -> bool {
        position >= self.min && position <= self.max
    }
}

impl Default for HitWindow {
    fn default() -> Self {
        Self {
            min: HIT_WINDOW_MIN,
            max: HIT_WINDOW_MAX,
        }
    }
}

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Difficulty picked for the next session
    pub difficulty: Difficulty,
    /// Play the backing track (off = timed fallback track)
    pub sound_enabled: bool,
    /// Simulation tick rate in Hz
    pub tick_rate: u32,
    /// Misses that end a session
    pub miss_limit: u32,
    /// Directory holding the per-user stats files
    pub stats_dir: PathBuf,
    /// Length of the timed fallback track (seconds)
    pub fallback_track_seconds: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            sound_enabled: true,
            tick_rate: DEFAULT_TICK_RATE,
            miss_limit: DEFAULT_MISS_LIMIT,
            stats_dir: PathBuf::from("saved_stats"),
            fallback_track_seconds: FALLBACK_TRACK_SECONDS,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("Using default settings ({}: {})", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring invalid settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Fallback track length in ticks at the configured rate
    pub fn fallback_track_ticks(&self) -> u64 {
        (self.fallback_track_seconds.max(0.0) * self.tick_rate as f32).round() as u64
    }
}

/// Immutable per-session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    /// Position units per tick, derived from difficulty
    pub fall_speed: f32,
    pub tick_rate: u32,
    pub song_id: u32,
    pub miss_limit: u32,
    pub hit_window: HitWindow,
    /// Position at which an unhit tile counts as missed
    pub miss_boundary: f32,
    pub spawn_position: f32,
    /// Hit line position used to grade hit quality
    pub ideal_position: f32,
    pub perfect_radius: f32,
    pub good_radius: f32,
    /// Play the supplied backing track; off = timed fallback track
    pub sound_enabled: bool,
    /// Length of the timed fallback track
    pub track_length_ticks: u64,
    /// Seed for lane selection
    pub seed: u64,
}

impl SessionConfig {
    /// Configuration with default rules for a difficulty and song
    pub fn new(difficulty: Difficulty, song_id: u32) -> Self {
        Self {
            difficulty,
            fall_speed: difficulty.fall_speed(),
            tick_rate: DEFAULT_TICK_RATE,
            song_id,
            miss_limit: DEFAULT_MISS_LIMIT,
            hit_window: HitWindow::default(),
            miss_boundary: BOARD_HEIGHT,
            spawn_position: SPAWN_POSITION,
            ideal_position: HIT_LINE,
            perfect_radius: PERFECT_RADIUS,
            good_radius: GOOD_RADIUS,
            sound_enabled: true,
            track_length_ticks: (FALLBACK_TRACK_SECONDS * DEFAULT_TICK_RATE as f32) as u64,
            seed: 0,
        }
    }

    /// Configuration for the settings' difficulty, tick rate and miss limit
    pub fn from_settings(settings: &Settings, song_id: u32) -> Self {
        Self {
            tick_rate: settings.tick_rate.max(1),
            miss_limit: settings.miss_limit.max(1),
            sound_enabled: settings.sound_enabled,
            track_length_ticks: settings.fallback_track_ticks(),
            ..Self::new(settings.difficulty, song_id)
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_miss_limit(mut self, miss_limit: u32) -> Self {
        self.miss_limit = miss_limit;
        self
    }

    pub fn with_sound(mut self, enabled: bool) -> Self {
        self.sound_enabled = enabled;
        self
    }

    pub fn with_track_length(mut self, ticks: u64) -> Self {
        self.track_length_ticks = ticks;
        self
    }

    /// Seconds per tick
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}
