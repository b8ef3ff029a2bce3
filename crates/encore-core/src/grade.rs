use std::fmt;
use strum::{EnumString, FromRepr};

/// Letter grade of a play, ordered best to worst.
///
/// `Xh`/`Sh` are the mod-adjusted twins of `X`/`S` (same precedence,
/// different client presentation); `N` is the "no grade" sentinel. The
/// discriminants are persisted, so their order is load-bearing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString, FromRepr,
)]
#[repr(u8)]
pub enum Grade {
    #[strum(serialize = "XH")]
    Xh = 0,
    #[strum(serialize = "SH")]
    Sh = 1,
    X = 2,
    S = 3,
    A = 4,
    B = 5,
    C = 6,
    D = 7,
    F = 8,
    N = 9,
}

impl Grade {
    /// Parse the letter the client reported with its submission.
    pub fn from_client(raw: &str) -> Option<Grade> {
        raw.parse().ok()
    }

    /// The grade a submission is stored with. The client letter is
    /// authoritative only for passed plays; a fail is always an F.
    pub fn for_submission(client: Grade, passed: bool) -> Grade {
        if passed {
            client
        } else {
            Grade::F
        }
    }
}

/// Display collapses the mod-adjusted tiers onto their base label.
impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Grade::Xh | Grade::Sh => "SS",
            Grade::X | Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
            Grade::N => "N",
        };
        f.write_str(label)
    }
}
