//! Match controller
//!
//! Ties the playfield, judgement and score together for one play session
//! and decides when it ends.
//!
//! Phase flow:
//! `Init -> Running <-> Paused -> {EndedWin, EndedLoss, Aborted}`

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::judge::{HitQuality, Judgement, judge};
use super::lanes::{LaneState, Playfield};
use super::result::SessionResult;
use super::score::{ScoreState, Tier};
use crate::consts::*;
use crate::settings::SessionConfig;
use crate::track::{TimedTrack, Track};

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Board prepared, track not started
    Init,
    /// Active gameplay
    Running,
    /// Ticks and key presses are ignored
    Paused,
    /// Track finished
    EndedWin,
    /// Miss limit reached
    EndedLoss,
    /// Cancelled by the player; nothing is recorded
    Aborted,
}

impl SessionPhase {
    pub fn is_running(&self) -> bool {
        *self == SessionPhase::Running
    }

    /// Finished with a result
    pub fn is_ended(&self) -> bool {
        matches!(self, SessionPhase::EndedWin | SessionPhase::EndedLoss)
    }

    /// No more gameplay will happen
    pub fn is_over(&self) -> bool {
        self.is_ended() || *self == SessionPhase::Aborted
    }
}

/// Most recent gameplay event, for hit/foul feedback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    Hit { lane: usize, quality: HitQuality },
    Wrong { lane: usize },
    /// Tile fell off the board at `fall_position`
    Miss { lane: usize, fall_position: f32 },
}

/// Immutable per-frame view for the render layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderState {
    pub lanes: [LaneState; LANES],
    pub score: ScoreState,
    pub tier: Tier,
    pub accuracy: f64,
    pub phase: SessionPhase,
    pub keys_held: [bool; LANES],
    /// Combo text scale, 1.0 at rest
    pub combo_pulse: f32,
    pub last_event: Option<MatchEvent>,
    pub ticks: u64,
}

/// Match handle for hosts that tick and read input on different threads
pub type SharedMatch = Arc<Mutex<Match>>;

/// One play session
pub struct Match {
    config: SessionConfig,
    user_id: String,
    field: Playfield,
    score: ScoreState,
    phase: SessionPhase,
    track: Box<dyn Track>,
    keys_held: [bool; LANES],
    combo_pulse: f32,
    last_event: Option<MatchEvent>,
    ticks: u64,
    result: Option<SessionResult>,
}

impl Match {
    /// Prepare a session. Without a track, or with sound off, a timed
    /// track of `config.track_length_ticks` decides when the song is over.
    pub fn new(config: SessionConfig, user_id: impl Into<String>, track: Option<Box<dyn Track>>) -> Self {
        let track: Box<dyn Track> = match track {
            Some(track) if config.sound_enabled => track,
            Some(_) => {
                log::info!(
                    "Sound off, song {} ends after {} ticks",
                    config.song_id,
                    config.track_length_ticks
                );
                Box::new(TimedTrack::new(config.track_length_ticks))
            }
            None => {
                log::warn!(
                    "No backing track for song {}, ending after {} ticks",
                    config.song_id,
                    config.track_length_ticks
                );
                Box::new(TimedTrack::new(config.track_length_ticks))
            }
        };

        let mut session = Self {
            field: Playfield::new(&config),
            config,
            user_id: user_id.into(),
            score: ScoreState::new(),
            phase: SessionPhase::Init,
            track,
            keys_held: [false; LANES],
            combo_pulse: 1.0,
            last_event: None,
            ticks: 0,
            result: None,
        };

        // Never start on an empty board
        session.field.spawn_tile(None);
        session
    }

    pub fn into_shared(self) -> SharedMatch {
        Arc::new(Mutex::new(self))
    }

    /// Start the track and begin play
    pub fn start(&mut self) -> bool {
        if self.phase != SessionPhase::Init {
            return false;
        }
        self.track.start(self.config.song_id);
        self.phase = SessionPhase::Running;
        log::info!(
            "Session started: user {}, song {}, {}",
            self.user_id,
            self.config.song_id,
            self.config.difficulty
        );
        true
    }

    /// Advance one fixed tick
    pub fn on_tick(&mut self) {
        if self.phase != SessionPhase::Running {
            return;
        }

        self.ticks += 1;
        self.track.advance(1);

        if self.combo_pulse > 1.0 {
            self.combo_pulse = (self.combo_pulse - COMBO_PULSE_DECAY).max(1.0);
        }

        if !self.track.is_playing() {
            self.finish(SessionPhase::EndedWin);
            return;
        }

        self.field.advance(1.0);

        for lane in self.field.detect_misses() {
            let fall_position = self.field.lane(lane).map_or(0.0, |l| l.fall_position);
            self.score.register_miss();
            self.field.clear(lane);
            self.last_event = Some(MatchEvent::Miss { lane, fall_position });

            if self.check_miss_limit() {
                return;
            }
            self.field.spawn_tile(Some(lane));
        }
    }

    /// Key press on the tick boundary
    pub fn on_key_down(&mut self, lane: usize) -> Option<Judgement> {
        self.on_key_down_at(lane, 0.0)
    }

    /// Key press `press_offset_ticks` after the last tick.
    /// Returns `None` when the press is ignored (not running, unmapped lane).
    pub fn on_key_down_at(&mut self, lane: usize, press_offset_ticks: f32) -> Option<Judgement> {
        if self.phase != SessionPhase::Running || lane >= LANES {
            return None;
        }
        self.keys_held[lane] = true;

        let judgement = judge(&self.field, &self.config, lane, press_offset_ticks);
        match judgement {
            Judgement::Hit(quality) => {
                self.score.register_hit(quality);
                self.combo_pulse = COMBO_PULSE_PEAK;
                self.last_event = Some(MatchEvent::Hit { lane, quality });
                self.field.clear(lane);
                self.field.spawn_tile(None);
            }
            Judgement::Wrong => {
                self.score.register_wrong();
                self.last_event = Some(MatchEvent::Wrong { lane });
                self.check_miss_limit();
            }
        }
        Some(judgement)
    }

    pub fn on_key_up(&mut self, lane: usize) {
        if let Some(held) = self.keys_held.get_mut(lane) {
            *held = false;
        }
    }

    /// Cancel the session. No result is produced for an aborted session.
    pub fn abort(&mut self) -> bool {
        if self.phase.is_over() {
            return false;
        }
        self.phase = SessionPhase::Aborted;
        self.track.stop();
        self.keys_held = [false; LANES];
        self.result = None;
        log::info!("Session aborted by {}", self.user_id);
        true
    }

    /// Running <-> Paused
    pub fn toggle_pause(&mut self) -> bool {
        self.phase = match self.phase {
            SessionPhase::Running => SessionPhase::Paused,
            SessionPhase::Paused => SessionPhase::Running,
            _ => return false,
        };
        log::debug!("Session {:?}", self.phase);
        true
    }

    /// Start over with a fresh board and score. Not possible once aborted.
    /// Any unclaimed result is dropped.
    pub fn restart(&mut self) -> bool {
        if matches!(self.phase, SessionPhase::Init | SessionPhase::Aborted) {
            return false;
        }

        self.field.clear_all();
        self.score.reset();
        self.keys_held = [false; LANES];
        self.combo_pulse = 1.0;
        self.last_event = None;
        self.ticks = 0;
        self.result = None;
        self.field.spawn_tile(None);

        self.track.stop();
        self.track.start(self.config.song_id);
        self.phase = SessionPhase::Running;
        log::info!("Session restarted by {}", self.user_id);
        true
    }

    fn check_miss_limit(&mut self) -> bool {
        if self.score.misses() >= self.config.miss_limit {
            self.finish(SessionPhase::EndedLoss);
            return true;
        }
        false
    }

    fn finish(&mut self, phase: SessionPhase) {
        self.phase = phase;
        self.track.stop();
        self.keys_held = [false; LANES];
        self.result = Some(SessionResult::from_score(&self.user_id, &self.config, &self.score));
        log::info!(
            "Session over ({:?}): score {}, hits {}, misses {}, max combo {}",
            phase,
            self.score.score(),
            self.score.hits(),
            self.score.misses(),
            self.score.max_combo()
        );
    }

    /// Result of an ended session, if not yet taken
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    /// Hand the result over; yields it at most once per ended session
    pub fn take_result(&mut self) -> Option<SessionResult> {
        self.result.take()
    }

    pub fn render_state(&self) -> RenderState {
        RenderState {
            lanes: *self.field.lanes(),
            score: self.score,
            tier: self.score.tier(),
            accuracy: self.score.accuracy(),
            phase: self.phase,
            keys_held: self.keys_held,
            combo_pulse: self.combo_pulse,
            last_event: self.last_event,
            ticks: self.ticks,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    pub fn field(&self) -> &Playfield {
        &self.field
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
