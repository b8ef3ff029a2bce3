//! The persistent score store: the trait the pipeline consumes and its
//! SQLite implementation.
//!
//! Score rows are partitioned into two tables by mode family (vanilla
//! vs. relax); the `mode` column inside each table holds the canonical
//! ruleset id, so all assist variants of a ruleset share one
//! leaderboard.

use crate::error::StoreError;
use encore_core::accuracy::HitCounts;
use encore_core::flags::ClientFlags;
use encore_core::grade::Grade;
use encore_core::mode::GameMode;
use encore_core::mods::Mods;
use encore_core::score::{Score, SubmissionStatus};
use sqlx::{Pool, Row, Sqlite};
use std::future::Future;

/// Which column a leaderboard orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Performance,
    Score,
}

impl Metric {
    pub fn for_mode(mode: GameMode) -> Metric {
        if mode.ranks_by_performance() {
            Metric::Performance
        } else {
            Metric::Score
        }
    }

    fn column(self) -> &'static str {
        match self {
            Metric::Performance => "pp",
            Metric::Score => "score",
        }
    }
}

/// Identity and performance value of a player's standing best on a map.
/// Status resolution compares on pp in every mode; the leaderboard
/// metric only governs placement queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestRef {
    pub id: i64,
    pub pp: f64,
}

/// A persisted score as stored, before domain types are rehydrated.
#[derive(Debug, Clone)]
pub struct ScoreRow {
    pub id: i64,
    pub map_md5: String,
    pub player_id: i64,
    pub pp: f64,
    pub score: i64,
    pub max_combo: i64,
    pub mods: i64,
    pub acc: f64,
    pub n300: i64,
    pub n100: i64,
    pub n50: i64,
    pub ngeki: i64,
    pub nkatu: i64,
    pub nmiss: i64,
    pub grade: i64,
    pub perfect: i64,
    pub status: i64,
    pub mode: i64,
    pub play_time: i64,
    pub time_elapsed: i64,
    pub client_flags: i64,
}

impl ScoreRow {
    /// Rehydrate the row into the domain model. Storage-trusted fields
    /// (accuracy, pp) are taken as-is; rank is left unset for the
    /// caller to recompute.
    pub fn into_score(self) -> Result<Score, StoreError> {
        let status = SubmissionStatus::from_repr(self.status as u8)
            .ok_or_else(|| StoreError::Corrupt(format!("status {}", self.status)))?;
        let grade = Grade::from_repr(self.grade as u8)
            .ok_or_else(|| StoreError::Corrupt(format!("grade {}", self.grade)))?;
        let mods = Mods::from_bits_truncate(self.mods as u32);
        let mode = GameMode::from_params(self.mode as u8, mods)
            .ok_or_else(|| StoreError::Corrupt(format!("mode {}", self.mode)))?;

        Ok(Score {
            id: self.id,
            map_md5: self.map_md5,
            player_id: self.player_id,
            pp: self.pp,
            score: self.score,
            max_combo: self.max_combo as u32,
            mods,
            acc: self.acc,
            hits: HitCounts {
                n300: self.n300 as u32,
                n100: self.n100 as u32,
                n50: self.n50 as u32,
                ngeki: self.ngeki as u32,
                nkatu: self.nkatu as u32,
                nmiss: self.nmiss as u32,
            },
            grade,
            rank: 0,
            passed: status != SubmissionStatus::Failed,
            perfect: self.perfect != 0,
            status,
            mode,
            play_time: self.play_time,
            time_elapsed: self.time_elapsed,
            client_flags: ClientFlags::from_bits_truncate(self.client_flags as u32),
            prev_best: None,
        })
    }
}

/// The store interface the pipeline depends on. Production uses
/// [`SqliteStore`]; tests substitute an in-memory fake.
pub trait ScoreStore: Send + Sync {
    fn fetch_score(
        &self,
        id: i64,
        mode: GameMode,
    ) -> impl Future<Output = Result<Option<ScoreRow>, StoreError>> + Send;

    /// The player's current `Best` record on (map, canonical mode).
    fn fetch_current_best(
        &self,
        player_id: i64,
        map_md5: &str,
        mode: GameMode,
    ) -> impl Future<Output = Result<Option<BestRef>, StoreError>> + Send;

    /// Number of `Best` records on (map, canonical mode) whose metric
    /// strictly exceeds `value`.
    fn count_better(
        &self,
        map_md5: &str,
        mode: GameMode,
        metric: Metric,
        value: f64,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Durably write a resolved submission. When `demote` names the
    /// superseded best, its status drops to `Submitted` in the same
    /// transaction as the insert. Returns the new score id.
    fn record_submission(
        &self,
        score: &Score,
        demote: Option<i64>,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send;
}

#[derive(Clone)]
pub struct SqliteStore {
    db: Pool<Sqlite>,
}

fn table(mode: GameMode) -> &'static str {
    if mode.is_relax() {
        "scores_rx"
    } else {
        "scores"
    }
}

impl SqliteStore {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }
}

impl ScoreStore for SqliteStore {
    async fn fetch_score(&self, id: i64, mode: GameMode) -> Result<Option<ScoreRow>, StoreError> {
        let sql = format!(
            "SELECT id, map_md5, userid, pp, score, max_combo, mods, acc, \
             n300, n100, n50, ngeki, nkatu, nmiss, grade, perfect, status, \
             mode, play_time, time_elapsed, client_flags \
             FROM {} WHERE id = ?",
            table(mode)
        );

        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.db).await?;
        let Some(r) = row else {
            return Ok(None);
        };

        Ok(Some(ScoreRow {
            id: r.try_get("id")?,
            map_md5: r.try_get("map_md5")?,
            player_id: r.try_get("userid")?,
            pp: r.try_get("pp")?,
            score: r.try_get("score")?,
            max_combo: r.try_get("max_combo")?,
            mods: r.try_get("mods")?,
            acc: r.try_get("acc")?,
            n300: r.try_get("n300")?,
            n100: r.try_get("n100")?,
            n50: r.try_get("n50")?,
            ngeki: r.try_get("ngeki")?,
            nkatu: r.try_get("nkatu")?,
            nmiss: r.try_get("nmiss")?,
            grade: r.try_get("grade")?,
            perfect: r.try_get("perfect")?,
            status: r.try_get("status")?,
            mode: r.try_get("mode")?,
            play_time: r.try_get("play_time")?,
            time_elapsed: r.try_get("time_elapsed")?,
            client_flags: r.try_get("client_flags")?,
        }))
    }

    async fn fetch_current_best(
        &self,
        player_id: i64,
        map_md5: &str,
        mode: GameMode,
    ) -> Result<Option<BestRef>, StoreError> {
        let sql = format!(
            "SELECT id, pp FROM {} \
             WHERE userid = ? AND map_md5 = ? AND mode = ? AND status = ?",
            table(mode)
        );

        let row = sqlx::query(&sql)
            .bind(player_id)
            .bind(map_md5)
            .bind(i64::from(mode.as_vanilla()))
            .bind(SubmissionStatus::Best as i64)
            .fetch_optional(&self.db)
            .await?;

        Ok(row
            .map(|r| -> Result<BestRef, sqlx::Error> {
                Ok(BestRef {
                    id: r.try_get("id")?,
                    pp: r.try_get("pp")?,
                })
            })
            .transpose()?)
    }

    async fn count_better(
        &self,
        map_md5: &str,
        mode: GameMode,
        metric: Metric,
        value: f64,
    ) -> Result<i64, StoreError> {
        let sql = format!(
            "SELECT COUNT(*) AS c FROM {} \
             WHERE map_md5 = ? AND mode = ? AND status = ? AND {} > ?",
            table(mode),
            metric.column()
        );

        let row = sqlx::query(&sql)
            .bind(map_md5)
            .bind(i64::from(mode.as_vanilla()))
            .bind(SubmissionStatus::Best as i64)
            .bind(value)
            .fetch_one(&self.db)
            .await?;

        Ok(row.try_get("c")?)
    }

    async fn record_submission(
        &self,
        score: &Score,
        demote: Option<i64>,
    ) -> Result<i64, StoreError> {
        let t = table(score.mode);
        let mut tx = self.db.begin().await?;

        if let Some(prev_id) = demote {
            let sql = format!("UPDATE {t} SET status = ? WHERE id = ?");
            sqlx::query(&sql)
                .bind(SubmissionStatus::Submitted as i64)
                .bind(prev_id)
                .execute(&mut *tx)
                .await?;
        }

        let sql = format!(
            "INSERT INTO {t} (map_md5, userid, pp, score, max_combo, mods, acc, \
             n300, n100, n50, ngeki, nkatu, nmiss, grade, perfect, status, \
             mode, play_time, time_elapsed, client_flags) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );

        let res = sqlx::query(&sql)
            .bind(&score.map_md5)
            .bind(score.player_id)
            .bind(score.pp)
            .bind(score.score)
            .bind(i64::from(score.max_combo))
            .bind(i64::from(score.mods.bits()))
            .bind(score.acc)
            .bind(i64::from(score.hits.n300))
            .bind(i64::from(score.hits.n100))
            .bind(i64::from(score.hits.n50))
            .bind(i64::from(score.hits.ngeki))
            .bind(i64::from(score.hits.nkatu))
            .bind(i64::from(score.hits.nmiss))
            .bind(score.grade as i64)
            .bind(i64::from(score.perfect))
            .bind(score.status as i64)
            .bind(i64::from(score.mode.as_vanilla()))
            .bind(score.play_time)
            .bind(score.time_elapsed)
            .bind(i64::from(score.client_flags.bits()))
            .execute(&mut *tx)
            .await?;

        let id = res.last_insert_rowid();
        tx.commit().await?;
        Ok(id)
    }
}
