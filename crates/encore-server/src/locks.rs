use encore_core::mode::GameMode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// The unit of mutual exclusion for status resolution: one player's
/// standing on one map in one mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubmissionKey {
    pub player_id: i64,
    pub map_md5: String,
    pub mode: GameMode,
}

impl SubmissionKey {
    pub fn new(player_id: i64, map_md5: &str, mode: GameMode) -> Self {
        Self {
            player_id,
            map_md5: map_md5.to_string(),
            mode,
        }
    }
}

/// Keyed async mutexes serializing the read-resolve-write section of
/// submission handling. Without this, two concurrent submissions for
/// the same key can both observe the same standing best and produce two
/// `Best` records.
#[derive(Default)]
pub struct SubmissionLocks {
    inner: Mutex<HashMap<SubmissionKey, Arc<AsyncMutex<()>>>>,
}

impl SubmissionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, waiting if another submission holds
    /// it. Entries are created on first use and kept for the process
    /// lifetime; the map is bounded by the set of played (player, map,
    /// mode) keys.
    pub async fn acquire(&self, key: SubmissionKey) -> OwnedMutexGuard<()> {
        let slot = {
            let mut map = self.inner.lock().expect("lock table poisoned");
            Arc::clone(map.entry(key).or_default())
        };

        slot.lock_owned().await
    }
}
