//! Async half of the Encore score server: collaborator traits, the
//! sqlx-backed implementations and the submission pipeline that wires
//! them together.

pub mod db;
pub mod engine;
pub mod error;
pub mod locks;
pub mod maps;
pub mod pipeline;
pub mod players;
pub mod routes;
pub mod state;
pub mod store;
