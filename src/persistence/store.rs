//! Per-user statistics store
//!
//! Two files per user under one directory:
//! - `last_<user>.properties`: the most recent finished session
//! - `lifetime_<user>.properties`: running totals plus personal bests
//!
//! Saves for the same user are serialized; different users save
//! independently. A failed write is logged and reported, never fatal.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::StatsError;
use super::kv::KvRecord;
use super::record::{LifetimeRecord, LifetimeSummary, last_from_kv, last_to_kv};
use crate::sim::SessionResult;

/// Outcome of `StatsStore::save`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub last_written: bool,
    pub lifetime_written: bool,
    /// The session set a new personal best for its song and difficulty
    pub new_best: bool,
}

pub struct StatsStore {
    dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl StatsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn last_path(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("last_{user_id}.properties"))
    }

    pub fn lifetime_path(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("lifetime_{user_id}.properties"))
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }

    /// Drop the user's lock entry once no other save holds it
    fn release_user_lock(&self, user_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock();
        // One reference in the map, one here
        if Arc::strong_count(&lock) == 2 {
            locks.remove(user_id);
        }
        // Release ours while the map is still locked
        drop(lock);
    }

    /// Persist a finished session: overwrite the last-game file and fold
    /// the result into the lifetime file.
    ///
    /// Only an invalid user id is an error. I/O failures are logged and
    /// show up as `false` flags in the report.
    pub fn save(&self, result: &SessionResult) -> Result<SaveReport, StatsError> {
        validate_user_id(&result.user_id)?;

        let lock = self.user_lock(&result.user_id);
        let report = {
            let _guard = lock.lock();
            self.save_locked(result)
        };
        self.release_user_lock(&result.user_id, lock);
        Ok(report)
    }

    fn save_locked(&self, result: &SessionResult) -> SaveReport {
        let mut report = SaveReport::default();

        let last_path = self.last_path(&result.user_id);
        match last_to_kv(result).write_atomic(&last_path) {
            Ok(()) => report.last_written = true,
            Err(e) => log::warn!("Failed to write last stats: {}", e),
        }

        let lifetime_path = self.lifetime_path(&result.user_id);
        let mut lifetime = match KvRecord::load(&lifetime_path) {
            Ok(Some(kv)) => LifetimeRecord::from_kv(&kv),
            Ok(None) => LifetimeRecord::default(),
            Err(StatsError::Malformed { reason, .. }) => {
                log::warn!(
                    "Lifetime stats for {} unreadable ({}), starting fresh",
                    result.user_id,
                    reason
                );
                LifetimeRecord::default()
            }
            Err(e) => {
                // Merging into empty totals here would clobber the real file
                log::warn!("Skipping lifetime update: {}", e);
                return report;
            }
        };

        report.new_best = lifetime.merge(result);
        match lifetime.to_kv().write_atomic(&lifetime_path) {
            Ok(()) => report.lifetime_written = true,
            Err(e) => {
                log::warn!("Failed to write lifetime stats: {}", e);
                report.new_best = false;
            }
        }

        log::info!(
            "Saved stats for {} (games: {}, new best: {})",
            result.user_id,
            lifetime.total_games,
            report.new_best
        );
        report
    }

    /// The user's most recent session, if one was saved and is readable
    pub fn load_last(&self, user_id: &str) -> Option<SessionResult> {
        validate_user_id(user_id).ok()?;
        let path = self.last_path(user_id);
        let kv = load_logged(&path)?;
        match last_from_kv(&kv, user_id) {
            Ok(result) => Some(result),
            Err(reason) => {
                log::warn!("Ignoring last stats {}: {}", path.display(), reason);
                None
            }
        }
    }

    pub fn load_lifetime(&self, user_id: &str) -> Option<LifetimeRecord> {
        validate_user_id(user_id).ok()?;
        load_logged(&self.lifetime_path(user_id)).map(|kv| LifetimeRecord::from_kv(&kv))
    }

    /// Lifetime totals plus the best record for one song and difficulty.
    /// `None` if the user has no lifetime file.
    pub fn load_lifetime_summary(
        &self,
        user_id: &str,
        song_id: u32,
        difficulty: &str,
    ) -> Option<LifetimeSummary> {
        self.load_lifetime(user_id)
            .map(|record| record.summary(user_id, song_id, difficulty))
    }
}

fn load_logged(path: &Path) -> Option<KvRecord> {
    match KvRecord::load(path) {
        Ok(kv) => kv,
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    }
}

/// User ids become file name components and a stored value. Values are
/// read back trimmed and cut at `;` or `#`.
fn validate_user_id(user_id: &str) -> Result<(), StatsError> {
    if user_id.is_empty() {
        return Err(StatsError::InvalidArgument("user id is empty".into()));
    }
    if user_id == "." || user_id == ".." {
        return Err(StatsError::InvalidArgument(format!("user id {user_id:?} is reserved")));
    }
    if user_id.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err(StatsError::InvalidArgument(format!(
            "user id {user_id:?} contains a path separator or control character"
        )));
    }
    if user_id.contains([';', '#']) {
        return Err(StatsError::InvalidArgument(format!(
            "user id {user_id:?} contains a comment character"
        )));
    }
    if user_id.trim() != user_id {
        return Err(StatsError::InvalidArgument(format!(
            "user id {user_id:?} has leading or trailing whitespace"
        )));
    }
    Ok(())
}
