//! Axum route handlers for source document upload.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::documents::extract::{extract_text, DocumentFormat, MAX_DOCUMENT_BYTES};
use crate::documents::storage::document_key;
use crate::errors::AppError;
use crate::models::document::{DocumentRow, DocumentType};
use crate::state::AppState;
use crate::store::NewDocument;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDocumentResponse {
    pub document: DocumentRow,
    /// False when the format is stored but not parsed (PDF/DOCX); the client
    /// has to provide the résumé text for generation itself.
    pub text_extracted: bool,
}

struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

/// POST /api/v1/documents
///
/// Multipart form: `file` (required), `document_type` (optional, default `cv`).
pub async fn handle_upload_document(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadDocumentResponse>), AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut document_type = DocumentType::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "uploaded_cv".to_string());
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            Some("document_type") => {
                let value = field.text().await.map_err(multipart_error)?;
                document_type = DocumentType::from_field(&value).ok_or_else(|| {
                    AppError::Validation(format!("Unknown document_type '{value}'"))
                })?;
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;

    if file.bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if file.bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(AppError::PayloadTooLarge(format!(
            "Documents are limited to {} MB",
            MAX_DOCUMENT_BYTES / (1024 * 1024)
        )));
    }

    let format = DocumentFormat::detect(file.content_type.as_deref(), &file.file_name)
        .ok_or_else(|| {
            AppError::UnsupportedMediaType("Supported formats: PDF, DOCX, TXT".to_string())
        })?;

    let extracted_text = extract_text(format, &file.bytes)?;

    let document_id = Uuid::new_v4();
    let key = document_key(user.id, document_id, &file.file_name);
    let file_size = file.bytes.len() as i64;

    state
        .storage
        .put(&key, file.bytes, format.mime_type())
        .await?;

    let document = state
        .store
        .insert_document(NewDocument {
            id: document_id,
            user_id: user.id,
            file_name: file.file_name,
            file_path: key,
            file_size,
            mime_type: format.mime_type().to_string(),
            extracted_text,
            document_type,
        })
        .await?;

    info!(
        "Stored document {} ({:?}, {} bytes) for user {}",
        document.id, format, file_size, user.id
    );

    let text_extracted = document.extracted_text.is_some();
    Ok((
        StatusCode::CREATED,
        Json(UploadDocumentResponse {
            document,
            text_extracted,
        }),
    ))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}
