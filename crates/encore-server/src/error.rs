use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt score row: {0}")]
    Corrupt(String),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("beatmap file unavailable: {0}")]
    MapUnavailable(#[from] std::io::Error),

    #[error("beatmap could not be parsed: {0}")]
    InvalidMap(String),
}

/// Failures that abort a submission outright. Rejections and suppressed
/// replies are not errors; they travel as `SubmissionOutcome` variants.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("performance engine failure: {0}")]
    Engine(#[from] EngineError),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

pub type SubmitResult<T> = Result<T, SubmitError>;

impl IntoResponse for SubmitError {
    fn into_response(self) -> Response {
        tracing::error!("submission aborted: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "internal server error" })),
        )
            .into_response()
    }
}
