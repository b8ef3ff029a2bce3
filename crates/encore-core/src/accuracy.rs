use crate::mode::GameMode;
use thiserror::Error;

/// Accuracy is only defined for the standard and taiko rulesets.
/// Catch and mania submissions surface this explicitly instead of
/// silently scoring 0%.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("accuracy is not defined for mode {0:?}")]
pub struct UnsupportedMode(pub GameMode);

/// Per-judgment hit tallies of a single play.
///
/// `n100` counts 150s in taiko; `ngeki`/`nkatu` are the mode-specific
/// bonus judgments and do not participate in accuracy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitCounts {
    pub n300: u32,
    pub n100: u32,
    pub n50: u32,
    pub ngeki: u32,
    pub nkatu: u32,
    pub nmiss: u32,
}

/// Accuracy percentage in `[0.0, 100.0]` for the given mode.
///
/// A play with zero judged notes is 0%, not a division error.
pub fn calculate(mode: GameMode, hits: &HitCounts) -> Result<f64, UnsupportedMode> {
    match mode.as_vanilla() {
        0 => Ok(standard(hits)),
        1 => Ok(taiko(hits)),
        _ => Err(UnsupportedMode(mode)),
    }
}

fn standard(hits: &HitCounts) -> f64 {
    let total = u64::from(hits.n300) + u64::from(hits.n100) + u64::from(hits.n50) + u64::from(hits.nmiss);
    if total == 0 {
        return 0.0;
    }

    let points = 50.0 * f64::from(hits.n50) + 100.0 * f64::from(hits.n100) + 300.0 * f64::from(hits.n300);
    100.0 * points / (total as f64 * 300.0)
}

fn taiko(hits: &HitCounts) -> f64 {
    let total = u64::from(hits.n300) + u64::from(hits.n100) + u64::from(hits.nmiss);
    if total == 0 {
        return 0.0;
    }

    let points = 150.0 * f64::from(hits.n100) + 300.0 * f64::from(hits.n300);
    100.0 * points / (total as f64 * 300.0)
}
