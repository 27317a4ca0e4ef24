//! Statistics persistence
//!
//! Features:
//! - Flat `key=value` files, one last-game and one lifetime file per user
//! - Atomic writes (tmp → rename)
//! - Lenient reads: bad numbers read as zero
//! - Personal bests keyed by song and normalized difficulty

pub mod error;
pub mod kv;
pub mod record;
pub mod store;

pub use error::StatsError;
pub use kv::KvRecord;
pub use record::{BestKey, BestRecord, LifetimeRecord, LifetimeSummary};
pub use store::{SaveReport, StatsStore};
