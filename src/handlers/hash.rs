use crate::{
    core::{JobId, Secret, ShutdownPhase},
    error::{AppError, Result},
    services::{JobLookup, JobStats},
    AppState,
};
use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Form,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
pub struct HashForm {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct PendingResponse {
    pub id: JobId,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ShutdownResponse {
    pub status: ShutdownPhase,
    pub message: &'static str,
}

/// JSON welcome message
pub async fn index(State(state): State<AppState>) -> Result<Json<Value>> {
    state.hash_service.ensure_accepting()?;

    Ok(Json(json!({
        "msg": "Hello, this is the deferred hashing service. POST a password to /hash to get started."
    })))
}

/// Accept a password and hand back the job identifier as plain text.
///
/// The form body wins; a `password` in the query string is used only when the
/// body carries none.
pub async fn submit_hash(
    State(state): State<AppState>,
    query: std::result::Result<Query<HashForm>, QueryRejection>,
    form: std::result::Result<Form<HashForm>, FormRejection>,
) -> Result<String> {
    state.hash_service.ensure_accepting()?;

    let body_password = match form {
        Ok(Form(form)) => form.password,
        Err(rejection) => {
            debug!(error = %rejection, "Unreadable hash form");
            String::new()
        }
    };
    let password = if body_password.is_empty() {
        query.map(|Query(query)| query.password).unwrap_or_default()
    } else {
        body_password
    };

    let id = state.hash_service.submit(Secret::new(password))?;
    Ok(id.to_string())
}

/// Digest as plain text once ready, `202 Accepted` with a pending marker before
pub async fn get_hash(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = JobId::from(id);

    match state.hash_service.retrieve(&id)? {
        JobLookup::Completed(digest) => Ok(digest.into_response()),
        JobLookup::Pending => Ok((
            StatusCode::ACCEPTED,
            Json(PendingResponse {
                id,
                status: "pending",
            }),
        )
            .into_response()),
        JobLookup::Failed(reason) => {
            warn!(job_id = %id, reason = %reason, "Requested a failed job");
            Err(AppError::JobFailed(reason))
        }
    }
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<JobStats>> {
    Ok(Json(state.hash_service.stats()?))
}

/// Start draining. Safe to call repeatedly.
pub async fn shutdown(State(state): State<AppState>) -> Json<ShutdownResponse> {
    let status = state.hash_service.request_shutdown();
    info!(phase = ?status, "Shutdown endpoint called");

    Json(ShutdownResponse {
        status,
        message: "Server is shutting down, pending jobs will finish first",
    })
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
