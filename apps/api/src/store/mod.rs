//! Persistence seam. Handlers and the generation pipeline only see `CvStore`;
//! `PgCvStore` is the production implementation.
//!
//! Every state-changing method is a single conditional statement so the
//! database, not the caller, decides whether a transition or credit
//! reservation wins under concurrency.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::content::OptimizedCvContent;
use crate::models::cv::{CvStatus, GeneratedCvRow, TemplateStyle};
use crate::models::document::{DocumentRow, DocumentType};
use crate::models::user::Profile;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgCvStore;

/// Fields for a new `documents` row.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub extracted_text: Option<String>,
    pub document_type: DocumentType,
}

/// Fields for a new generation job; it always starts `pending`.
#[derive(Debug, Clone)]
pub struct NewGeneratedCv {
    pub user_id: Uuid,
    pub source_document_id: Option<Uuid>,
    pub job_title: Option<String>,
    pub job_company: Option<String>,
    pub job_description: String,
    pub job_url: Option<String>,
    pub template_style: TemplateStyle,
    pub is_anonymous: bool,
    pub language: String,
}

/// Listing options for a user's jobs.
#[derive(Debug, Clone, Default)]
pub struct CvListFilter {
    pub status: Option<CvStatus>,
    /// Case-insensitive match against job title or company.
    pub query: Option<String>,
    pub limit: Option<i64>,
}

#[async_trait]
pub trait CvStore: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError>;

    async fn update_profile_name(
        &self,
        user_id: Uuid,
        full_name: Option<String>,
    ) -> Result<Option<Profile>, AppError>;

    /// Atomically takes one credit if the balance is positive.
    /// Returns the remaining balance, or `None` if nothing was taken.
    async fn reserve_credit(&self, user_id: Uuid) -> Result<Option<i32>, AppError>;

    /// Returns a previously reserved credit.
    async fn refund_credit(&self, user_id: Uuid) -> Result<(), AppError>;

    async fn insert_document(&self, document: NewDocument) -> Result<DocumentRow, AppError>;

    async fn get_document(&self, user_id: Uuid, id: Uuid)
        -> Result<Option<DocumentRow>, AppError>;

    async fn insert_cv(&self, cv: NewGeneratedCv) -> Result<GeneratedCvRow, AppError>;

    async fn get_cv(&self, user_id: Uuid, id: Uuid) -> Result<Option<GeneratedCvRow>, AppError>;

    /// Newest first.
    async fn list_cvs(
        &self,
        user_id: Uuid,
        filter: &CvListFilter,
    ) -> Result<Vec<GeneratedCvRow>, AppError>;

    async fn count_cvs(&self, user_id: Uuid) -> Result<i64, AppError>;

    async fn delete_cv(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError>;

    /// pending → processing. `None` if the job is missing, not owned, or not pending.
    async fn mark_processing(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<GeneratedCvRow>, AppError>;

    /// processing → completed with the result payload. `false` if the job was not processing.
    async fn mark_completed(&self, id: Uuid, content: &OptimizedCvContent)
        -> Result<bool, AppError>;

    /// processing → failed with a message. `false` if the job was not processing.
    async fn mark_failed(&self, id: Uuid, error_message: &str) -> Result<bool, AppError>;

    async fn log_usage(&self, user_id: Uuid, action: &str, metadata: Value)
        -> Result<(), AppError>;
}

/// Escapes LIKE wildcards and wraps the term for a substring match.
pub(crate) fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
