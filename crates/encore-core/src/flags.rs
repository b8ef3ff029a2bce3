use bitflags::bitflags;

bitflags! {
    /// Client-side anti-cheat flags. An empty set means a clean play.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ClientFlags: u32 {
        const SPEED_HACK_DETECTED   = 1 << 1;
        const INCORRECT_MOD_VALUE   = 1 << 2;
        const MULTIPLE_OSU_CLIENTS  = 1 << 3;
        const CHECKSUM_FAILURE      = 1 << 4;
        const FLASHLIGHT_CHECKSUM   = 1 << 5;
    }
}

/// How the anti-cheat flags are derived from the trailing submission
/// field. The derivation is deliberately pluggable: the stock heuristic
/// is weak and servers tend to replace it.
pub trait FlagPolicy: Send + Sync {
    fn derive(&self, token: &str) -> ClientFlags;
}

/// Stock policy: the client smuggles the flag bits as the number of
/// trailing spaces in the last field.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceHeuristic;

impl FlagPolicy for WhitespaceHeuristic {
    fn derive(&self, token: &str) -> ClientFlags {
        let spaces = token.bytes().filter(|b| *b == b' ').count();
        ClientFlags::from_bits_truncate(spaces as u32)
    }
}
