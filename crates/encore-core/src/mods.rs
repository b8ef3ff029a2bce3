use bitflags::bitflags;

bitflags! {
    /// Gameplay modifier flags as submitted by the client.
    ///
    /// Only the subset relevant to scoring and mode resolution is named;
    /// unknown bits are dropped on decode via `from_bits_truncate`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Mods: u32 {
        const NOFAIL       = 1 << 0;
        const EASY         = 1 << 1;
        const TOUCHSCREEN  = 1 << 2;
        const HIDDEN       = 1 << 3;
        const HARDROCK     = 1 << 4;
        const SUDDEN_DEATH = 1 << 5;
        const DOUBLE_TIME  = 1 << 6;
        const RELAX        = 1 << 7;
        const HALF_TIME    = 1 << 8;
        const NIGHTCORE    = 1 << 9;
        const FLASHLIGHT   = 1 << 10;
        const AUTOPLAY     = 1 << 11;
        const SPUN_OUT     = 1 << 12;
        const AUTOPILOT    = 1 << 13;
        const PERFECT      = 1 << 14;
    }
}
