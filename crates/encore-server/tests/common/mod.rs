//! Shared fixtures: in-memory collaborator fakes and an encrypted
//! payload builder mirroring the client's submission format.

#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use cbc::cipher::block_padding::ZeroPadding;
use cbc::cipher::{BlockEncryptMut, KeyIvInit};
use encore_core::accuracy::HitCounts;
use encore_core::flags::ClientFlags;
use encore_core::grade::Grade;
use encore_core::mode::GameMode;
use encore_core::mods::Mods;
use encore_core::score::{Score, SubmissionStatus};
use encore_server::engine::{Performance, PerformanceEngine, PerformanceRequest};
use encore_server::error::{EngineError, StoreError};
use encore_server::maps::{Beatmap, MapLookup};
use encore_server::pipeline::RawSubmission;
use encore_server::players::{Player, PlayerLookup};
use encore_server::store::{BestRef, Metric, ScoreRow, ScoreStore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

pub const KEY_PREFIX: &str = "osu!-scoreburgr---------";
pub const VERSION: &str = "20250829";
pub const CREDENTIAL: &str = "0123456789abcdef0123456789abcdef";
pub const MAP_MD5: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

pub fn encrypt_payload(plaintext: &str) -> (String, String) {
    let mut key = [0u8; 32];
    let src = format!("{KEY_PREFIX}{VERSION}");
    let n = src.len().min(32);
    key[..n].copy_from_slice(&src.as_bytes()[..n]);

    let iv = [9u8; 16];
    let ct = Aes256CbcEnc::new_from_slices(&key, &iv)
        .unwrap()
        .encrypt_padded_vec_mut::<ZeroPadding>(plaintext.as_bytes());

    (BASE64.encode(ct), BASE64.encode(iv))
}

/// Plaintext builder for a standard-mode play; callers tweak the knobs
/// a test cares about.
pub struct Play {
    pub name: &'static str,
    pub n300: u32,
    pub nmiss: u32,
    pub score: i64,
    pub combo: u32,
    pub grade: &'static str,
    pub mods: u32,
    pub passed: bool,
    pub mode: u8,
}

impl Default for Play {
    fn default() -> Self {
        Self {
            name: "fieryrage",
            n300: 500,
            nmiss: 0,
            score: 1_000_000,
            combo: 250,
            grade: "S",
            mods: 0,
            passed: true,
            mode: 0,
        }
    }
}

impl Play {
    pub fn plaintext(&self) -> String {
        let passed = if self.passed { "True" } else { "False" };
        format!(
            "{MAP_MD5}:{}:chk:{}:0:0:0:0:{}:{}:{}:0:{}:{}:{passed}:{}:250829120000:flags",
            self.name, self.n300, self.nmiss, self.score, self.combo, self.grade, self.mods, self.mode
        )
    }

    pub fn raw(&self) -> RawSubmission {
        let (payload, iv) = encrypt_payload(&self.plaintext());
        RawSubmission {
            payload,
            iv,
            client_version: VERSION.to_string(),
            credential: CREDENTIAL.to_string(),
            time_elapsed_ms: 61_000,
        }
    }
}

pub fn mk_score(player_id: i64, mode: GameMode, pp: f64, score: i64) -> Score {
    Score {
        id: 0,
        map_md5: MAP_MD5.to_string(),
        player_id,
        pp,
        score,
        max_combo: 100,
        mods: if mode.is_relax() {
            Mods::RELAX
        } else {
            Mods::empty()
        },
        acc: 95.0,
        hits: HitCounts {
            n300: 100,
            ..Default::default()
        },
        grade: Grade::S,
        rank: 0,
        passed: true,
        perfect: false,
        status: SubmissionStatus::Best,
        mode,
        play_time: 1_756_400_000,
        time_elapsed: 61_000,
        client_flags: ClientFlags::empty(),
        prev_best: None,
    }
}

pub fn row_from_score(score: &Score, id: i64) -> ScoreRow {
    ScoreRow {
        id,
        map_md5: score.map_md5.clone(),
        player_id: score.player_id,
        pp: score.pp,
        score: score.score,
        max_combo: i64::from(score.max_combo),
        mods: i64::from(score.mods.bits()),
        acc: score.acc,
        n300: i64::from(score.hits.n300),
        n100: i64::from(score.hits.n100),
        n50: i64::from(score.hits.n50),
        ngeki: i64::from(score.hits.ngeki),
        nkatu: i64::from(score.hits.nkatu),
        nmiss: i64::from(score.hits.nmiss),
        grade: score.grade as i64,
        perfect: i64::from(score.perfect),
        status: score.status as i64,
        mode: i64::from(score.mode.as_vanilla()),
        play_time: score.play_time,
        time_elapsed: score.time_elapsed,
        client_flags: i64::from(score.client_flags.bits()),
    }
}

// ---------------------------------------------------------------------
// Store fake
// ---------------------------------------------------------------------

#[derive(Default)]
struct MemInner {
    rows: Mutex<Vec<ScoreRow>>,
}

/// In-memory score store. `lookup_delay` widens the read-resolve-write
/// window so racing submissions actually overlap.
#[derive(Clone, Default)]
pub struct MemStore {
    inner: Arc<MemInner>,
    lookup_delay: Duration,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lookup_delay(delay: Duration) -> Self {
        Self {
            inner: Arc::default(),
            lookup_delay: delay,
        }
    }

    pub async fn seed(&self, row: ScoreRow) {
        self.inner.rows.lock().await.push(row);
    }

    pub async fn all_rows(&self) -> Vec<ScoreRow> {
        self.inner.rows.lock().await.clone()
    }

    pub async fn statuses(&self) -> Vec<i64> {
        self.inner
            .rows
            .lock()
            .await
            .iter()
            .map(|r| r.status)
            .collect()
    }
}

impl ScoreStore for MemStore {
    async fn fetch_score(&self, id: i64, _mode: GameMode) -> Result<Option<ScoreRow>, StoreError> {
        let rows = self.inner.rows.lock().await;
        Ok(rows.iter().find(|r| r.id == id).cloned())
    }

    async fn fetch_current_best(
        &self,
        player_id: i64,
        map_md5: &str,
        mode: GameMode,
    ) -> Result<Option<BestRef>, StoreError> {
        if !self.lookup_delay.is_zero() {
            tokio::time::sleep(self.lookup_delay).await;
        }

        let rows = self.inner.rows.lock().await;
        Ok(rows
            .iter()
            .find(|r| {
                r.player_id == player_id
                    && r.map_md5 == map_md5
                    && r.mode == i64::from(mode.as_vanilla())
                    && r.status == SubmissionStatus::Best as i64
            })
            .map(|r| BestRef { id: r.id, pp: r.pp }))
    }

    async fn count_better(
        &self,
        map_md5: &str,
        mode: GameMode,
        metric: Metric,
        value: f64,
    ) -> Result<i64, StoreError> {
        let rows = self.inner.rows.lock().await;
        let count = rows
            .iter()
            .filter(|r| {
                r.map_md5 == map_md5
                    && r.mode == i64::from(mode.as_vanilla())
                    && r.status == SubmissionStatus::Best as i64
            })
            .filter(|r| match metric {
                Metric::Performance => r.pp > value,
                Metric::Score => r.score as f64 > value,
            })
            .count();

        Ok(count as i64)
    }

    async fn record_submission(
        &self,
        score: &Score,
        demote: Option<i64>,
    ) -> Result<i64, StoreError> {
        let mut rows = self.inner.rows.lock().await;

        if let Some(prev_id) = demote {
            if let Some(prev) = rows.iter_mut().find(|r| r.id == prev_id) {
                prev.status = SubmissionStatus::Submitted as i64;
            }
        }

        let id = rows.len() as i64 + 1;
        rows.push(row_from_score(score, id));
        Ok(id)
    }
}

// ---------------------------------------------------------------------
// Map / player / engine fakes
// ---------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct FakeMaps {
    maps: HashMap<String, Beatmap>,
}

impl FakeMaps {
    pub fn with_default_map() -> Self {
        let mut maps = HashMap::new();
        maps.insert(
            MAP_MD5.to_string(),
            Beatmap {
                md5: MAP_MD5.to_string(),
                id: 53,
                set_id: 1,
                artist: "Kenji Ninuma".to_string(),
                title: "DISCO PRINCE".to_string(),
                version: "Normal".to_string(),
            },
        );
        Self { maps }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl MapLookup for FakeMaps {
    async fn resolve_by_checksum(&self, md5: &str) -> Result<Option<Beatmap>, StoreError> {
        Ok(self.maps.get(md5).cloned())
    }
}

#[derive(Clone, Default)]
pub struct FakePlayers {
    players: HashMap<String, Player>,
}

impl FakePlayers {
    pub fn logged_in(names: &[(&str, i64)]) -> Self {
        let players = names
            .iter()
            .map(|(name, id)| {
                (
                    name.to_string(),
                    Player {
                        id: *id,
                        name: name.to_string(),
                    },
                )
            })
            .collect();
        Self { players }
    }
}

impl PlayerLookup for FakePlayers {
    async fn resolve_logged_in(
        &self,
        name: &str,
        credential: &str,
    ) -> Result<Option<Player>, StoreError> {
        if credential != CREDENTIAL {
            return Ok(None);
        }
        Ok(self.players.get(name).cloned())
    }

    async fn resolve_by_id(&self, id: i64) -> Result<Option<Player>, StoreError> {
        Ok(self.players.values().find(|p| p.id == id).cloned())
    }
}

/// Deterministic engine: pp equals the play's max combo, so tests dial
/// in exact performance values.
#[derive(Clone, Default)]
pub struct ComboEngine;

impl PerformanceEngine for ComboEngine {
    async fn evaluate(
        &self,
        _map: &Beatmap,
        req: &PerformanceRequest,
    ) -> Result<Performance, EngineError> {
        Ok(Performance {
            pp: f64::from(req.max_combo),
            stars: 5.0,
        })
    }
}

/// Engine that always fails; for abort-path tests.
#[derive(Clone, Default)]
pub struct BrokenEngine;

impl PerformanceEngine for BrokenEngine {
    async fn evaluate(
        &self,
        _map: &Beatmap,
        _req: &PerformanceRequest,
    ) -> Result<Performance, EngineError> {
        Err(EngineError::InvalidMap("broken on purpose".to_string()))
    }
}
