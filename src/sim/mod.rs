//! Deterministic gameplay simulation
//!
//! All gameplay rules live here:
//! - Fixed timestep only
//! - Seeded RNG only (lane selection)
//! - No rendering, audio or storage dependencies

pub mod autoplay;
pub mod clock;
pub mod judge;
pub mod lanes;
pub mod result;
pub mod score;
pub mod session;

pub use autoplay::Autoplay;
pub use clock::TickDriver;
pub use judge::{HitQuality, Judgement, judge};
pub use lanes::{LaneState, Playfield};
pub use result::{SessionResult, TIME_FORMAT};
pub use score::{ScoreState, Tier};
pub use session::{Match, MatchEvent, RenderState, SessionPhase, SharedMatch};
