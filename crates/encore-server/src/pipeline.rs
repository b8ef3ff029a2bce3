//! The submission pipeline: decode, resolve collaborators, score,
//! resolve status, persist, rank. Stages run strictly in sequence;
//! every await is a collaborator round-trip.

use crate::engine::{Performance, PerformanceEngine, PerformanceRequest};
use crate::error::SubmitResult;
use crate::locks::{SubmissionKey, SubmissionLocks};
use crate::maps::{Beatmap, MapLookup};
use crate::players::PlayerLookup;
use crate::store::{Metric, ScoreStore};
use chrono::Utc;
use encore_core::accuracy;
use encore_core::flags::{FlagPolicy, WhitespaceHeuristic};
use encore_core::mode::GameMode;
use encore_core::score::{Score, SubmissionStatus};
use encore_core::submission::{self, DecodeError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// The raw submission as handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct RawSubmission {
    /// Base64 ciphertext of the colon-delimited score record.
    pub payload: String,
    /// Base64 initialization vector.
    pub iv: String,
    /// Client version string; completes the payload key.
    pub client_version: String,
    /// Pre-hashed login credential.
    pub credential: String,
    /// Wall-clock play duration in milliseconds.
    pub time_elapsed_ms: i64,
}

/// Why a submission was answered with an explicit failure.
#[derive(Error, Debug)]
pub enum RejectReason {
    #[error("malformed submission: {0}")]
    Malformed(#[from] DecodeError),

    #[error("mode {0:?} is not accepted for ranking")]
    UnsupportedMode(GameMode),
}

/// What the transport should tell the client.
///
/// `Suppressed` means the named player is not logged in: the transport
/// must not reply at all, so the client's retry-after-login kicks in.
#[derive(Debug)]
pub enum SubmissionOutcome {
    Accepted(Box<Score>),
    Rejected(RejectReason),
    Suppressed,
}

/// Outcome of status resolution, to be persisted as one durable write.
struct Resolution {
    status: SubmissionStatus,
    prev_best: Option<Score>,
    demote: Option<i64>,
}

pub struct Pipeline<S, M, P, E> {
    store: S,
    maps: M,
    players: P,
    engine: E,
    flag_policy: Box<dyn FlagPolicy>,
    locks: SubmissionLocks,
}

impl<S, M, P, E> Pipeline<S, M, P, E>
where
    S: ScoreStore,
    M: MapLookup,
    P: PlayerLookup,
    E: PerformanceEngine,
{
    pub fn new(store: S, maps: M, players: P, engine: E) -> Self {
        Self {
            store,
            maps,
            players,
            engine,
            flag_policy: Box::new(WhitespaceHeuristic),
            locks: SubmissionLocks::new(),
        }
    }

    /// Swap the anti-cheat flag derivation.
    pub fn with_flag_policy(mut self, policy: Box<dyn FlagPolicy>) -> Self {
        self.flag_policy = policy;
        self
    }

    /// Run one submission through the whole pipeline.
    ///
    /// `Err` is reserved for engine/store failures, which abort with no
    /// partial writes; everything the client can cause is an `Ok`
    /// outcome.
    pub async fn submit(&self, raw: &RawSubmission) -> SubmitResult<SubmissionOutcome> {
        let fields =
            match submission::decode(&raw.payload, &raw.iv, &raw.client_version) {
                Ok(fields) => fields,
                Err(e) => {
                    warn!("rejecting malformed submission: {e}");
                    return Ok(SubmissionOutcome::Rejected(RejectReason::Malformed(e)));
                }
            };

        let map = self.maps.resolve_by_checksum(&fields.map_md5).await?;
        let player = match self
            .players
            .resolve_logged_in(&fields.player_name, &raw.credential)
            .await?
        {
            Some(p) => p,
            None => {
                // Not an error: no reply is sent so the client retries
                // after logging in.
                debug!(name = %fields.player_name, "player not logged in, suppressing reply");
                return Ok(SubmissionOutcome::Suppressed);
            }
        };

        let acc = match accuracy::calculate(fields.mode, &fields.hits) {
            Ok(acc) => acc,
            Err(e) => {
                warn!(player = %player.name, "{e}");
                return Ok(SubmissionOutcome::Rejected(RejectReason::UnsupportedMode(
                    fields.mode,
                )));
            }
        };

        let mut score = Score {
            id: 0,
            map_md5: fields.map_md5,
            player_id: player.id,
            pp: 0.0,
            score: fields.score,
            max_combo: fields.max_combo,
            mods: fields.mods,
            acc,
            hits: fields.hits,
            grade: fields.grade,
            rank: 0,
            passed: fields.passed,
            perfect: fields.perfect,
            status: SubmissionStatus::Failed,
            mode: fields.mode,
            play_time: Utc::now().timestamp(),
            time_elapsed: raw.time_elapsed_ms,
            client_flags: self.flag_policy.derive(&fields.flags_token),
            prev_best: None,
        };

        match map {
            Some(map) => {
                let perf = self.evaluate_performance(&map, &score).await?;
                score.pp = perf.pp;

                // Hold the key for the read-resolve-write section so a
                // concurrent submission cannot observe a stale best.
                let key = SubmissionKey::new(player.id, &score.map_md5, score.mode);
                let _guard = self.locks.acquire(key).await;

                let resolution = self.resolve_status(&score).await?;
                score.status = resolution.status;
                score.prev_best = resolution.prev_best.map(Box::new);
                score.id = self
                    .store
                    .record_submission(&score, resolution.demote)
                    .await?;
                score.rank = self.placement(&score).await?;
            }
            None => {
                // Unknown map: nothing to rank against, no standing
                // best to resolve.
                score.status = if score.passed {
                    SubmissionStatus::Submitted
                } else {
                    SubmissionStatus::Failed
                };
                score.id = self.store.record_submission(&score, None).await?;
            }
        }

        info!(
            player = %player.name,
            map = %score.map_md5,
            status = ?score.status,
            pp = score.pp,
            rank = score.rank,
            "🎯 score submitted"
        );

        Ok(SubmissionOutcome::Accepted(Box::new(score)))
    }

    /// Reconstruct a persisted score. Rank is recomputed against the
    /// current leaderboard when the map still resolves; the stored
    /// record itself is never mutated.
    pub async fn load_score(&self, id: i64, mode: GameMode) -> SubmitResult<Option<Score>> {
        let Some(row) = self.store.fetch_score(id, mode).await? else {
            return Ok(None);
        };

        let mut score = row.into_score()?;

        if self.players.resolve_by_id(score.player_id).await?.is_none() {
            warn!(score_id = id, player_id = score.player_id, "score owner no longer resolves");
        }

        if self.maps.resolve_by_checksum(&score.map_md5).await?.is_some() {
            score.rank = self.placement(&score).await?;
        }

        Ok(Some(score))
    }

    /// 1-based leaderboard placement among `Best` records on the map.
    pub async fn placement(&self, score: &Score) -> SubmitResult<i64> {
        let metric = Metric::for_mode(score.mode);
        let value = match metric {
            Metric::Performance => score.pp,
            Metric::Score => score.score as f64,
        };

        let better = self
            .store
            .count_better(&score.map_md5, score.mode, metric, value)
            .await?;

        Ok(better + 1)
    }

    /// Only standard and taiko have a performance formula today; other
    /// modes are valued at zero without consulting the engine.
    async fn evaluate_performance(
        &self,
        map: &Beatmap,
        score: &Score,
    ) -> SubmitResult<Performance> {
        if !matches!(score.mode.as_vanilla(), 0 | 1) {
            return Ok(Performance::default());
        }

        let req = PerformanceRequest {
            mods: score.mods,
            max_combo: score.max_combo,
            nmiss: score.hits.nmiss,
            mode: score.mode,
            acc: score.acc,
        };

        Ok(self.engine.evaluate(map, &req).await?)
    }

    /// Decide FAILED / SUBMITTED / BEST against the player's standing
    /// best. The comparison is always on pp, even in modes whose
    /// leaderboard orders by raw score. Ties never promote; only a
    /// strictly better pp takes over, and the superseded record is
    /// demoted in the same durable write.
    async fn resolve_status(&self, score: &Score) -> SubmitResult<Resolution> {
        if !score.passed {
            return Ok(Resolution {
                status: SubmissionStatus::Failed,
                prev_best: None,
                demote: None,
            });
        }

        let Some(best) = self
            .store
            .fetch_current_best(score.player_id, &score.map_md5, score.mode)
            .await?
        else {
            // First score on the map.
            return Ok(Resolution {
                status: SubmissionStatus::Best,
                prev_best: None,
                demote: None,
            });
        };

        let prev_best = self.load_score(best.id, score.mode).await?;
        if prev_best.is_none() {
            warn!(best_id = best.id, "standing best vanished during resolution");
        }

        if score.pp > best.pp {
            Ok(Resolution {
                status: SubmissionStatus::Best,
                prev_best,
                demote: Some(best.id),
            })
        } else {
            Ok(Resolution {
                status: SubmissionStatus::Submitted,
                prev_best,
                demote: None,
            })
        }
    }
}
