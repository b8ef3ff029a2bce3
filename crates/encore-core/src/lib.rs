//! Pure domain logic for the Encore score server: game modes, mods,
//! grades, accuracy, the score model and the submission payload decoder.
//! Nothing in this crate performs I/O; the async pipeline lives in
//! `encore-server`.

pub mod accuracy;
pub mod flags;
pub mod grade;
pub mod mode;
pub mod mods;
pub mod score;
pub mod submission;
