//! The performance/difficulty engine boundary.
//!
//! The numeric formulas are not ours; production delegates to rosu-pp
//! over the map geometry on disk. The pipeline only decides *when* to
//! invoke it and treats any engine failure as fatal for the submission.

use crate::error::EngineError;
use crate::maps::Beatmap;
use encore_core::mode::GameMode;
use encore_core::mods::Mods;
use std::future::Future;
use std::path::PathBuf;
use std::str::FromStr;

/// Play parameters the engine needs to value a score on a map.
#[derive(Debug, Clone, Copy)]
pub struct PerformanceRequest {
    pub mods: Mods,
    pub max_combo: u32,
    pub nmiss: u32,
    pub mode: GameMode,
    pub acc: f64,
}

/// Engine output. The difficulty rating rides along but nothing
/// downstream consumes it yet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Performance {
    pub pp: f64,
    pub stars: f64,
}

pub trait PerformanceEngine: Send + Sync {
    fn evaluate(
        &self,
        map: &Beatmap,
        req: &PerformanceRequest,
    ) -> impl Future<Output = Result<Performance, EngineError>> + Send;
}

/// rosu-pp backed engine reading `.osu` files from a local directory.
#[derive(Clone)]
pub struct RosuEngine {
    maps_dir: PathBuf,
}

impl RosuEngine {
    pub fn new(maps_dir: PathBuf) -> Self {
        Self { maps_dir }
    }
}

impl PerformanceEngine for RosuEngine {
    async fn evaluate(
        &self,
        map: &Beatmap,
        req: &PerformanceRequest,
    ) -> Result<Performance, EngineError> {
        let path = self.maps_dir.join(map.filename());
        let raw = tokio::fs::read_to_string(&path).await?;

        let parsed = rosu_pp::Beatmap::from_str(&raw)
            .map_err(|e| EngineError::InvalidMap(e.to_string()))?;

        let attrs = rosu_pp::Performance::new(&parsed)
            .mods(req.mods.bits())
            .combo(req.max_combo)
            .misses(req.nmiss)
            .accuracy(req.acc)
            .calculate();

        Ok(Performance {
            pp: attrs.pp(),
            stars: attrs.stars(),
        })
    }
}
