//! Axum route handler for the Generation API.

use axum::{extract::State, Json};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::generation::generator::{generate_cv, GenerateCvRequest, GenerateCvResponse};
use crate::state::AppState;

/// POST /api/v1/generate-cv
///
/// Runs the optimization for a pending job and blocks until the upstream call
/// returns. On success the body is `{ success, data, cvId }`; on upstream
/// failure the job is marked failed and a 500 is returned.
pub async fn handle_generate_cv(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(request): AppJson<GenerateCvRequest>,
) -> Result<Json<GenerateCvResponse>, AppError> {
    let response = generate_cv(
        state.store.clone(),
        state.llm.clone(),
        state.llm_timeout,
        user.id,
        request,
    )
    .await?;

    Ok(Json(response))
}
