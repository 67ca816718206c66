//! HTTP surface for the student registry.
//!
//! Routes, matched in this order of precedence:
//!
//! - `GET /students/{id}/summary` – Ask the text-generation service to summarize one student.
//! - `GET|PUT|DELETE /students/{id}` – Read, fully replace, or delete one student.
//! - `GET|POST /students` – List all students or create a new one (the store assigns the ID).
//!
//! Any other verb on these paths answers `405 Method not allowed`. `/students/` with nothing
//! after it is `400 Invalid endpoint`, and any other path below `/students/` is treated as a
//! malformed ID. Success bodies are JSON; error bodies are the plain-text messages of
//! [`ApiError`].

use crate::store::{StoreError, Student, StudentId, StudentStore};
use crate::summarization::SummaryClient;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

const STUDENTS_PREFIX: &str = "/students/";

/// Errors reported to HTTP callers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Request body did not decode as a student record.
    #[error("Invalid input")]
    InvalidInput,
    /// Path ID segment is not an integer.
    #[error("Invalid ID")]
    InvalidId,
    /// Path shape is not a known endpoint.
    #[error("Invalid endpoint")]
    InvalidEndpoint,
    /// Referenced student does not exist.
    #[error("Student not found")]
    NotFound,
    /// Verb is not supported on this path.
    #[error("Method not allowed")]
    MethodNotAllowed,
    /// Summary service failed or answered with something unusable.
    #[error("Error generating summary")]
    SummaryGenerationFailed,
}

impl ApiError {
    /// HTTP status associated with this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput | Self::InvalidId | Self::InvalidEndpoint => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::SummaryGenerationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(inner: StoreError) -> Self {
        match inner {
            StoreError::NotFound(_) => Self::NotFound,
        }
    }
}

struct AppState<C> {
    store: Arc<StudentStore>,
    summarizer: Arc<C>,
}

/// Build the HTTP router over a shared store and summary client.
pub fn create_router<C>(store: Arc<StudentStore>, summarizer: Arc<C>) -> Router
where
    C: SummaryClient + 'static,
{
    let state = Arc::new(AppState { store, summarizer });
    Router::new()
        .route(
            "/students",
            get(list_students::<C>)
                .post(create_student::<C>)
                .fallback(method_not_allowed),
        )
        .route(
            "/students/:id",
            get(get_student::<C>)
                .put(update_student::<C>)
                .delete(delete_student::<C>)
                .fallback(method_not_allowed),
        )
        .route(
            "/students/:id/summary",
            get(summarize_student::<C>).fallback(method_not_allowed),
        )
        .fallback(unmatched_path)
        // Record size is unbounded; oversized payloads must not turn into 413.
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

fn parse_id(raw: &str) -> Result<StudentId, ApiError> {
    raw.parse().map_err(|_| ApiError::InvalidId)
}

/// Decode a request body as a record. Only a JSON object qualifies, so `null` is invalid input.
fn decode_student(body: &[u8]) -> Result<Student, ApiError> {
    serde_json::from_slice(body).map_err(|error| {
        tracing::debug!(%error, "Rejected student payload");
        ApiError::InvalidInput
    })
}

/// Create a student from the request body; any supplied `id` is replaced.
async fn create_student<C>(
    State(state): State<Arc<AppState<C>>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Student>), ApiError>
where
    C: SummaryClient,
{
    let student = state.store.create(decode_student(&body)?);
    tracing::info!(id = student.id, "Created student");
    Ok((StatusCode::CREATED, Json(student)))
}

async fn list_students<C>(State(state): State<Arc<AppState<C>>>) -> Json<Vec<Student>>
where
    C: SummaryClient,
{
    Json(state.store.get_all())
}

async fn get_student<C>(
    State(state): State<Arc<AppState<C>>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Student>, ApiError>
where
    C: SummaryClient,
{
    let id = parse_id(&raw_id)?;
    Ok(Json(state.store.get(id)?))
}

/// Replace a student in full. The ID is validated before the body is decoded.
async fn update_student<C>(
    State(state): State<Arc<AppState<C>>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<Student>, ApiError>
where
    C: SummaryClient,
{
    let id = parse_id(&raw_id)?;
    let student = state.store.update(id, decode_student(&body)?)?;
    tracing::info!(id, "Updated student");
    Ok(Json(student))
}

/// Delete a student. Always `204`, whether or not the ID existed.
async fn delete_student<C>(
    State(state): State<Arc<AppState<C>>>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    C: SummaryClient,
{
    let id = parse_id(&raw_id)?;
    let removed = state.store.delete(id);
    tracing::info!(id, removed, "Deleted student");
    Ok(StatusCode::NO_CONTENT)
}

/// Response body for `GET /students/{id}/summary`.
#[derive(Serialize)]
struct SummaryResponse {
    summary: String,
}

/// Summarize a snapshot of the student taken at lookup time.
async fn summarize_student<C>(
    State(state): State<Arc<AppState<C>>>,
    Path(raw_id): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError>
where
    C: SummaryClient,
{
    let id = parse_id(&raw_id)?;
    let student = state.store.get(id)?;
    let summary = state.summarizer.summarize(&student).await.map_err(|error| {
        tracing::warn!(id, %error, "Summary generation failed");
        ApiError::SummaryGenerationFailed
    })?;
    tracing::info!(id, "Generated student summary");
    Ok(Json(SummaryResponse { summary }))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn unmatched_path(uri: Uri) -> Response {
    match uri.path().strip_prefix(STUDENTS_PREFIX) {
        Some("") => ApiError::InvalidEndpoint.into_response(),
        Some(_) => ApiError::InvalidId.into_response(),
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}
