//! Backing-track contract
//!
//! The audio layer lives outside the core. A match only needs to start and
//! stop the song and ask whether it is still playing; the end of the song
//! is the win condition.

/// A playable backing track
pub trait Track: Send {
    fn start(&mut self, song_id: u32);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;

    /// Called once per simulation tick while the match runs.
    /// Audio-backed tracks can ignore it.
    fn advance(&mut self, _ticks: u64) {}
}

/// Track that "plays" for a fixed number of ticks.
///
/// Used when no audio is available so a session still reaches its natural
/// end.
#[derive(Debug, Clone)]
pub struct TimedTrack {
    length_ticks: u64,
    elapsed_ticks: u64,
    playing: bool,
}

impl TimedTrack {
    pub fn new(length_ticks: u64) -> Self {
        Self {
            length_ticks,
            elapsed_ticks: 0,
            playing: false,
        }
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    pub fn remaining_ticks(&self) -> u64 {
        self.length_ticks.saturating_sub(self.elapsed_ticks)
    }
}

impl Track for TimedTrack {
    fn start(&mut self, song_id: u32) {
        log::debug!(
            "Timed track for song {} started ({} ticks)",
            song_id,
            self.length_ticks
        );
        self.elapsed_ticks = 0;
        self.playing = self.length_ticks > 0;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn advance(&mut self, ticks: u64) {
        if !self.playing {
            return;
        }
        self.elapsed_ticks = self.elapsed_ticks.saturating_add(ticks);
        if self.elapsed_ticks >= self.length_ticks {
            self.playing = false;
        }
    }
}
