use crate::error::StoreError;
use sqlx::{Pool, Row, Sqlite};
use std::future::Future;

#[derive(Debug, Clone)]
pub struct Player {
    pub id: i64,
    pub name: String,
}

/// Identity/session collaborator. Session management itself lives
/// elsewhere; submission handling only asks whether the named player is
/// currently logged in with the presented credential.
pub trait PlayerLookup: Send + Sync {
    fn resolve_logged_in(
        &self,
        name: &str,
        credential: &str,
    ) -> impl Future<Output = Result<Option<Player>, StoreError>> + Send;

    fn resolve_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<Player>, StoreError>> + Send;
}

#[derive(Clone)]
pub struct SqlPlayers {
    db: Pool<Sqlite>,
}

impl SqlPlayers {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }
}

impl PlayerLookup for SqlPlayers {
    async fn resolve_logged_in(
        &self,
        name: &str,
        credential: &str,
    ) -> Result<Option<Player>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name FROM players WHERE name = ? AND pass_md5 = ? AND online = 1",
        )
        .bind(name)
        .bind(credential)
        .fetch_optional(&self.db)
        .await?;

        Ok(row
            .map(|r| -> Result<Player, sqlx::Error> {
                Ok(Player {
                    id: r.try_get("id")?,
                    name: r.try_get("name")?,
                })
            })
            .transpose()?)
    }

    async fn resolve_by_id(&self, id: i64) -> Result<Option<Player>, StoreError> {
        let row = sqlx::query("SELECT id, name FROM players WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row
            .map(|r| -> Result<Player, sqlx::Error> {
                Ok(Player {
                    id: r.try_get("id")?,
                    name: r.try_get("name")?,
                })
            })
            .transpose()?)
    }
}
