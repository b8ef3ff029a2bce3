use clap::Parser;
use encore_server::{db, routes, state::AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Parser)]
struct Args {
    #[arg(long, default_value = "sqlite://encore.db")]
    db: String,

    /// Directory holding the `.osu` map files the performance engine
    /// reads.
    #[arg(long, short, default_value = "maps")]
    maps: PathBuf,

    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    info!("🎵 Encore score server is initializing...");

    let pool = db::init_db(&args.db).await?;
    let state = Arc::new(AppState::new(pool, args.maps));

    let app = routes::submission_routes()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("🚀 Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
