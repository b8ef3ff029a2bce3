use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::info;

pub async fn init_db(db_url: &str) -> Result<Pool<Sqlite>, sqlx::Error> {
    info!("🔌 Opening database {db_url}");

    let opts = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect_with(opts)
        .await?;

    let schema = include_str!("../schema.sql");
    apply_schema(&pool, schema).await?;

    info!("✅ Database ready, schema applied");
    Ok(pool)
}

pub async fn apply_schema(pool: &Pool<Sqlite>, schema: &str) -> Result<(), sqlx::Error> {
    for stmt in schema.split(';') {
        let sql = stmt.trim();
        if sql.is_empty() {
            continue;
        }
        sqlx::query(sql).execute(pool).await?;
    }

    Ok(())
}
