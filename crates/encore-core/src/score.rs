use crate::accuracy::HitCounts;
use crate::flags::ClientFlags;
use crate::grade::Grade;
use crate::mode::GameMode;
use crate::mods::Mods;
use strum::FromRepr;

/// Lifecycle state of a persisted score. The discriminants are stored
/// and compared numerically (`status = 2` predicates, `status >= 1`
/// reads), so they must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FromRepr)]
#[repr(u8)]
pub enum SubmissionStatus {
    Failed = 0,
    Submitted = 1,
    Best = 2,
}

/// A single play, either decoded from a live submission or reconstructed
/// from the store.
///
/// `rank` is a read-time computation against the current leaderboard and
/// is never trusted from persisted state. `prev_best` is populated while
/// resolving a live submission and points at the record that held `Best`
/// immediately before this one; demoting it is part of the same durable
/// write as inserting this score.
#[derive(Debug, Clone)]
pub struct Score {
    /// Store-assigned identity; 0 until persisted.
    pub id: i64,
    pub map_md5: String,
    pub player_id: i64,

    pub pp: f64,
    pub score: i64,
    pub max_combo: u32,
    pub mods: Mods,

    pub acc: f64,
    pub hits: HitCounts,
    pub grade: Grade,

    /// 1-based leaderboard placement; 0 when the map never resolved.
    pub rank: i64,
    pub passed: bool,
    pub perfect: bool,
    pub status: SubmissionStatus,

    pub mode: GameMode,
    /// Server-side UNIX timestamp of submission. Client clocks are not
    /// trusted.
    pub play_time: i64,
    /// Wall-clock play duration in milliseconds, reported by the
    /// transport next to the encrypted payload.
    pub time_elapsed: i64,

    pub client_flags: ClientFlags,

    pub prev_best: Option<Box<Score>>,
}
