//! Axum route handlers for Generation Job CRUD.
//!
//! Creating a job only records what to optimize against; the upstream call
//! happens in `POST /api/v1/generate-cv`.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::generation::generator::MIN_JOB_DESCRIPTION_CHARS;
use crate::models::cv::{CvStatus, GeneratedCvRow, OutputLanguage, ResultView, TemplateStyle};
use crate::state::AppState;
use crate::store::{CvListFilter, NewGeneratedCv};

const MAX_LIST_LIMIT: i64 = 100;

/// Body of `POST /api/v1/cvs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCvRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_document_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_company: Option<String>,
    #[serde(default)]
    pub job_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    #[serde(default)]
    pub template_style: TemplateStyle,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListCvsQuery {
    pub status: Option<String>,
    pub q: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CvDetailResponse {
    pub cv: GeneratedCvRow,
    pub view: ResultView,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// POST /api/v1/cvs
pub async fn handle_create_cv(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateCvRequest>,
) -> Result<(StatusCode, Json<GeneratedCvRow>), AppError> {
    let job_description = req.job_description.trim().to_string();
    if job_description.chars().count() < MIN_JOB_DESCRIPTION_CHARS {
        return Err(AppError::Validation(format!(
            "jobDescription must be at least {MIN_JOB_DESCRIPTION_CHARS} characters"
        )));
    }

    if let Some(document_id) = req.source_document_id {
        state
            .store
            .get_document(user.id, document_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {document_id} not found")))?;
    }

    let language = req
        .language
        .as_deref()
        .map(OutputLanguage::from_code)
        .unwrap_or_default();

    let cv = state
        .store
        .insert_cv(NewGeneratedCv {
            user_id: user.id,
            source_document_id: req.source_document_id,
            job_title: non_blank(req.job_title),
            job_company: non_blank(req.job_company),
            job_description,
            job_url: non_blank(req.job_url),
            template_style: req.template_style,
            is_anonymous: req.is_anonymous,
            language: language.code().to_string(),
        })
        .await?;

    info!("Created pending CV {} for user {}", cv.id, user.id);
    Ok((StatusCode::CREATED, Json(cv)))
}

/// GET /api/v1/cvs?status=&q=&limit=
pub async fn handle_list_cvs(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(params): AppQuery<ListCvsQuery>,
) -> Result<Json<Vec<GeneratedCvRow>>, AppError> {
    let status = match params.status.as_deref().filter(|s| !s.is_empty() && *s != "all") {
        Some(value) => Some(
            CvStatus::parse(value)
                .ok_or_else(|| AppError::Validation(format!("Unknown status '{value}'")))?,
        ),
        None => None,
    };

    let filter = CvListFilter {
        status,
        query: non_blank(params.q),
        limit: Some(params.limit.unwrap_or(MAX_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)),
    };

    let cvs = state.store.list_cvs(user.id, &filter).await?;
    Ok(Json(cvs))
}

/// GET /api/v1/cvs/:id
pub async fn handle_get_cv(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<CvDetailResponse>, AppError> {
    let cv = state
        .store
        .get_cv(user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("CV {id} not found")))?;

    let view = cv.result_view();
    Ok(Json(CvDetailResponse { cv, view }))
}

/// DELETE /api/v1/cvs/:id
pub async fn handle_delete_cv(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_cv(user.id, id).await? {
        return Err(AppError::NotFound(format!("CV {id} not found")));
    }
    info!("Deleted CV {id} for user {}", user.id);
    Ok(StatusCode::NO_CONTENT)
}
