//! Fixed timestep driver
//!
//! Converts variable frame times into a whole number of simulation ticks.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS};

/// Accumulates frame time and releases fixed ticks
#[derive(Debug, Clone)]
pub struct TickDriver {
    dt: f32,
    accumulator: f32,
    total_ticks: u64,
}

impl TickDriver {
    /// Driver for a tick rate in Hz
    pub fn new(tick_rate: u32) -> Self {
        Self {
            dt: 1.0 / tick_rate.max(1) as f32,
            accumulator: 0.0,
            total_ticks: 0,
        }
    }

    /// Seconds per tick
    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Add a frame's elapsed time and run `on_tick` for every whole tick
    /// it covers, capped at `MAX_SUBSTEPS`. Returns the ticks run.
    pub fn run(&mut self, frame_dt: f32, mut on_tick: impl FnMut()) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < MAX_SUBSTEPS {
            on_tick();
            self.accumulator -= self.dt;
            substeps += 1;
        }
        self.total_ticks += substeps as u64;
        substeps
    }

    /// Fraction of a tick accumulated since the last tick, 0..1
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.dt).clamp(0.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.total_ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_ticks_only() {
        let mut driver = TickDriver::new(100);
        let mut ticks = 0;
        assert_eq!(driver.run(0.025, || ticks += 1), 2);
        assert_eq!(ticks, 2);
        assert!((driver.alpha() - 0.5).abs() < 1e-3);

        assert_eq!(driver.run(0.006, || ticks += 1), 1);
        assert_eq!(driver.total_ticks(), 3);
    }

    #[test]
    fn test_substep_cap() {
        let mut driver = TickDriver::new(120);
        // A long stall is clamped to MAX_FRAME_DT, then capped per frame
        let ran = driver.run(5.0, || {});
        assert_eq!(ran, MAX_SUBSTEPS);
        assert!(driver.alpha() <= 1.0);
    }

    #[test]
    fn test_negative_frame_ignored() {
        let mut driver = TickDriver::new(120);
        assert_eq!(driver.run(-1.0, || {}), 0);
        assert_eq!(driver.alpha(), 0.0);
    }
}
