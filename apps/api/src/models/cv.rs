use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::generation::content::OptimizedCvContent;

/// Lifecycle of a generation job. Moves forward only:
/// pending → processing → completed | failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "cv_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CvStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl CvStatus {
    pub fn can_transition_to(self, next: CvStatus) -> bool {
        matches!(
            (self, next),
            (CvStatus::Pending, CvStatus::Processing)
                | (CvStatus::Processing, CvStatus::Completed)
                | (CvStatus::Processing, CvStatus::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CvStatus::Completed | CvStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CvStatus::Pending => "pending",
            CvStatus::Processing => "processing",
            CvStatus::Completed => "completed",
            CvStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(CvStatus::Pending),
            "processing" => Some(CvStatus::Processing),
            "completed" => Some(CvStatus::Completed),
            "failed" => Some(CvStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "template_style", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TemplateStyle {
    #[default]
    Professional,
    Modern,
    Minimal,
    Creative,
}

/// Output language of the rewritten résumé. Unknown codes fall back to English.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputLanguage {
    #[default]
    English,
    German,
    French,
    Spanish,
}

impl OutputLanguage {
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "de" => OutputLanguage::German,
            "fr" => OutputLanguage::French,
            "es" => OutputLanguage::Spanish,
            _ => OutputLanguage::English,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            OutputLanguage::English => "en",
            OutputLanguage::German => "de",
            OutputLanguage::French => "fr",
            OutputLanguage::Spanish => "es",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OutputLanguage::English => "English",
            OutputLanguage::German => "German",
            OutputLanguage::French => "French",
            OutputLanguage::Spanish => "Spanish",
        }
    }
}

/// One optimization attempt, as stored in `generated_cvs`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCvRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub source_document_id: Option<Uuid>,
    pub job_title: Option<String>,
    pub job_company: Option<String>,
    pub job_description: String,
    pub job_url: Option<String>,
    pub template_style: TemplateStyle,
    pub is_anonymous: bool,
    pub language: String,
    pub optimized_content: Option<Json<OptimizedCvContent>>,
    pub ats_score: Option<f64>,
    pub keyword_match_percentage: Option<f64>,
    pub suggestions: Option<Vec<String>>,
    pub status: CvStatus,
    pub error_message: Option<String>,
    pub processing_started_at: Option<DateTime<Utc>>,
    pub processing_completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// What the result page shows for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultView {
    /// Spinner; the client re-fetches until this changes.
    InProgress,
    /// Error panel with `error_message`.
    Failed,
    /// Structured résumé from `optimized_content`.
    Ready,
}

impl GeneratedCvRow {
    pub fn result_view(&self) -> ResultView {
        match self.status {
            CvStatus::Pending | CvStatus::Processing => ResultView::InProgress,
            CvStatus::Failed => ResultView::Failed,
            CvStatus::Completed => ResultView::Ready,
        }
    }
}
