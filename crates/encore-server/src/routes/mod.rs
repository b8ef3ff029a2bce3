pub mod submit;

use crate::state::AppState;
use axum::routing::post;
use axum::Router;
use std::sync::Arc;

pub fn submission_routes() -> Router<Arc<AppState>> {
    Router::new().route("/web/submit", post(submit::submit_score))
}
