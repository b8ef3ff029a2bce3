use crate::mods::Mods;
use strum::FromRepr;

/// A gameplay ruleset combined with its optional relax variant.
///
/// Leaderboards and best-score bookkeeping are partitioned per *vanilla*
/// ruleset; the relax variants share the vanilla identifier through
/// [`GameMode::as_vanilla`] but live in a separate score partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FromRepr)]
#[repr(u8)]
pub enum GameMode {
    Standard = 0,
    Taiko = 1,
    Catch = 2,
    Mania = 3,
    RelaxStandard = 4,
    RelaxTaiko = 5,
    RelaxCatch = 6,
}

impl GameMode {
    /// Resolve the effective mode from the client-reported vanilla id and
    /// the modifier set. Mania has no relax variant.
    pub fn from_params(vanilla: u8, mods: Mods) -> Option<GameMode> {
        if vanilla > 3 {
            return None;
        }
        if mods.contains(Mods::RELAX) && vanilla != 3 {
            GameMode::from_repr(vanilla + 4)
        } else {
            GameMode::from_repr(vanilla)
        }
    }

    /// The canonical ruleset identifier; relax variants fold back onto it.
    pub fn as_vanilla(&self) -> u8 {
        let id = *self as u8;
        if id >= 4 {
            id - 4
        } else {
            id
        }
    }

    pub fn is_relax(&self) -> bool {
        (*self as u8) >= 4
    }

    /// Whether leaderboards for this mode order by performance value.
    /// Everything up to relax-standard ranks on pp, the rest on raw score.
    pub fn ranks_by_performance(&self) -> bool {
        (*self as u8) <= GameMode::RelaxStandard as u8
    }
}
