use crate::engine::RosuEngine;
use crate::maps::SqlMaps;
use crate::pipeline::Pipeline;
use crate::players::SqlPlayers;
use crate::store::SqliteStore;
use sqlx::{Pool, Sqlite};
use std::path::PathBuf;

pub type LivePipeline = Pipeline<SqliteStore, SqlMaps, SqlPlayers, RosuEngine>;

pub struct AppState {
    pub pipeline: LivePipeline,
}

impl AppState {
    pub fn new(db: Pool<Sqlite>, maps_dir: PathBuf) -> Self {
        let pipeline = Pipeline::new(
            SqliteStore::new(db.clone()),
            SqlMaps::new(db.clone()),
            SqlPlayers::new(db),
            RosuEngine::new(maps_dir),
        );

        Self { pipeline }
    }
}
