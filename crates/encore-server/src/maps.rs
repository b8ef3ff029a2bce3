use crate::error::StoreError;
use sqlx::{Pool, Row, Sqlite};
use std::future::Future;

/// Beatmap metadata as far as submission handling needs it. The full
/// catalogue (ranked status, difficulty attributes, update tracking)
/// belongs to the metadata service that fills this table.
#[derive(Debug, Clone)]
pub struct Beatmap {
    pub md5: String,
    pub id: i64,
    pub set_id: i64,
    pub artist: String,
    pub title: String,
    pub version: String,
}

impl Beatmap {
    /// Canonical on-disk filename of the map geometry.
    pub fn filename(&self) -> String {
        format!("{}.osu", self.id)
    }
}

pub trait MapLookup: Send + Sync {
    /// An unknown checksum is a legal outcome, not an error: clients
    /// submit plays on maps the server has never seen.
    fn resolve_by_checksum(
        &self,
        md5: &str,
    ) -> impl Future<Output = Result<Option<Beatmap>, StoreError>> + Send;
}

#[derive(Clone)]
pub struct SqlMaps {
    db: Pool<Sqlite>,
}

impl SqlMaps {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }
}

impl MapLookup for SqlMaps {
    async fn resolve_by_checksum(&self, md5: &str) -> Result<Option<Beatmap>, StoreError> {
        let row = sqlx::query(
            "SELECT md5, id, set_id, artist, title, version FROM beatmaps WHERE md5 = ?",
        )
        .bind(md5)
        .fetch_optional(&self.db)
        .await?;

        Ok(row
            .map(|r| -> Result<Beatmap, sqlx::Error> {
                Ok(Beatmap {
                    md5: r.try_get("md5")?,
                    id: r.try_get("id")?,
                    set_id: r.try_get("set_id")?,
                    artist: r.try_get("artist")?,
                    title: r.try_get("title")?,
                    version: r.try_get("version")?,
                })
            })
            .transpose()?)
    }
}
