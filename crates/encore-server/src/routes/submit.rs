use crate::error::SubmitError;
use crate::pipeline::{RawSubmission, SubmissionOutcome};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct SubmitForm {
    /// Base64 ciphertext of the score record.
    pub score: String,
    /// Base64 initialization vector.
    pub iv: String,
    /// Client version string.
    pub osuver: String,
    /// Pre-hashed login credential.
    pub pass: String,
    /// Play duration in milliseconds.
    #[serde(default)]
    pub st: i64,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub id: i64,
    pub status: u8,
    pub grade: String,
    pub rank: i64,
    pub pp: f64,
}

pub async fn submit_score(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SubmitForm>,
) -> Result<Response, SubmitError> {
    let raw = RawSubmission {
        payload: form.score,
        iv: form.iv,
        client_version: form.osuver,
        credential: form.pass,
        time_elapsed_ms: form.st,
    };

    match state.pipeline.submit(&raw).await? {
        SubmissionOutcome::Accepted(score) => Ok(Json(SubmitResponse {
            id: score.id,
            status: score.status as u8,
            grade: score.grade.to_string(),
            rank: score.rank,
            pp: score.pp,
        })
        .into_response()),

        SubmissionOutcome::Rejected(reason) => Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": reason.to_string() })),
        )
            .into_response()),

        // No body at all: the client retries once it logs back in.
        SubmissionOutcome::Suppressed => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}
