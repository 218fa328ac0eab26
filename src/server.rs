//! HTTP boundary: the generic per-task request handler
//!
//! One POST route serves all six tasks, addressed by slug. The handler
//! parses the body itself (so malformed JSON yields the crate's `{error}`
//! shape rather than the framework's), runs the cheap local checks before
//! any upstream call, then drives the orchestrator.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tracing::Instrument;

use crate::error::TaskError;
use crate::generate::GenerationBackend;
use crate::orchestrator;
use crate::tasks::TaskKind;
use crate::types::TaskInput;

/// Defense-in-depth ceiling on the encoded image string, in characters.
/// Deliberately larger than the client-side normalizer's byte budget.
pub const DEFAULT_MAX_IMAGE_CHARS: usize = 10_000_000;

const IMAGE_DATA_URI_PREFIX: &str = "data:image/";

/// Process-wide state: the long-lived generator handle plus limits.
/// Read-only after startup; shared across requests behind an `Arc`.
pub struct AppState {
    pub backend: Arc<dyn GenerationBackend>,
    pub max_image_chars: usize,
}

impl AppState {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            max_image_chars: DEFAULT_MAX_IMAGE_CHARS,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/{task}", post(handle_task))
        // The handler enforces its own size ceiling (`max_image_chars`) and
        // must read oversize bodies to emit the crate's 400, so the
        // framework's default 2 MB limit must not intercept first.
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn handle_task(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    body: String,
) -> Response {
    let Some(task) = TaskKind::from_slug(&slug) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Unknown task '{slug}'") })),
        )
            .into_response();
    };
    match run_task(&state, task, &body).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn run_task(state: &AppState, task: TaskKind, body: &str) -> Result<Value, TaskError> {
    let input: TaskInput = serde_json::from_str(body)
        .map_err(|e| TaskError::InvalidInput(format!("Invalid request body: {e}")))?;

    check_image_payload(&input, state.max_image_chars)?;
    let spec = task.spec();
    spec.check_inputs(&input)?;

    let request = spec.to_request(&input);
    let span = tracing::info_span!("task_request", task = task.slug());
    orchestrator::run(state.backend.as_ref(), &request)
        .instrument(span)
        .await
}

/// Local checks on the image payload, run before any upstream call.
/// Size first: the oversize rejection must not depend on prefix validity.
fn check_image_payload(input: &TaskInput, max_chars: usize) -> Result<(), TaskError> {
    let Some(url) = input.image_data_url.as_deref().filter(|s| !s.trim().is_empty()) else {
        return Ok(());
    };
    if url.len() > max_chars {
        return Err(TaskError::InvalidInput(format!(
            "Image too large (max {max_chars} characters)"
        )));
    }
    if !url.trim_start().starts_with(IMAGE_DATA_URI_PREFIX) {
        return Err(TaskError::InvalidInput(
            "Invalid image data: expected an image data URI".into(),
        ));
    }
    Ok(())
}
