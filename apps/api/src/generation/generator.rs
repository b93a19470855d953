//! CV generation: one optimization attempt for an existing job.
//!
//! Flow: validate → load profile → check job is pending → reserve credit →
//!       pending→processing → LLM call → parse → processing→completed|failed →
//!       audit log.
//!
//! A free-tier credit is taken before the upstream call with one conditional
//! decrement and handed back if the job fails, so the balance never goes
//! negative and a failed job costs nothing. The upstream call is bounded by
//! the configured timeout and never retried: the client starts a new job
//! instead.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::content::{parse_optimized_content, OptimizedCvContent};
use crate::generation::prompts::{build_optimization_prompt, optimization_system_prompt};
use crate::llm_client::{CompletionRequest, TextGenerator};
use crate::models::cv::{CvStatus, OutputLanguage, TemplateStyle};
use crate::store::CvStore;

/// Shortest job description (trimmed, in characters) worth optimizing against.
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 50;

/// Audit action recorded for each completed generation.
pub const CV_GENERATED_ACTION: &str = "cv_generated";

// ────────────────────────────────────────────────────────────────────────────
// Request / response
// ────────────────────────────────────────────────────────────────────────────

/// Body of `POST /api/v1/generate-cv`. Every field is optional on the wire so
/// missing values surface as a 400 rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCvRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_cv_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    /// Rendering happens client-side; accepted for compatibility and logged only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_style: Option<TemplateStyle>,
    /// Falls back to the job's stored flag when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_anonymous: Option<bool>,
    /// Falls back to the job's stored language when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCvResponse {
    pub success: bool,
    pub data: OptimizedCvContent,
    pub cv_id: Uuid,
}

struct ValidatedRequest {
    cv_id: Uuid,
    extracted_text: String,
    job_description: String,
}

fn validate(request: &GenerateCvRequest) -> Result<ValidatedRequest, AppError> {
    let non_blank = |v: &Option<String>| v.as_deref().filter(|s| !s.trim().is_empty()).map(String::from);

    let (Some(cv_id), Some(extracted_text), Some(job_description)) = (
        request.generated_cv_id,
        non_blank(&request.extracted_text),
        non_blank(&request.job_description),
    ) else {
        return Err(AppError::Validation("Missing required fields".to_string()));
    };

    if job_description.trim().chars().count() < MIN_JOB_DESCRIPTION_CHARS {
        return Err(AppError::Validation(format!(
            "jobDescription must be at least {MIN_JOB_DESCRIPTION_CHARS} characters"
        )));
    }

    Ok(ValidatedRequest {
        cv_id,
        extracted_text,
        job_description,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs one generation for `user_id` and persists every status transition.
///
/// Validation and lookups run on the caller's future and leave no trace in
/// the store. Everything from the credit reservation on runs in its own task:
/// a dropped request cannot cancel it, so the job always ends `completed` or
/// `failed` and a reserved credit is either spent or handed back.
pub async fn generate_cv(
    store: Arc<dyn CvStore>,
    llm: Arc<dyn TextGenerator>,
    llm_timeout: Duration,
    user_id: Uuid,
    request: GenerateCvRequest,
) -> Result<GenerateCvResponse, AppError> {
    let input = validate(&request)?;
    let cv_id = input.cv_id;

    let profile = store
        .get_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    let job = store
        .get_cv(user_id, cv_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("CV {cv_id} not found")))?;

    if !job.status.can_transition_to(CvStatus::Processing) {
        let message = if job.status.is_terminal() {
            format!("CV {cv_id} is already {}", job.status.as_str())
        } else {
            format!("CV {cv_id} is already being generated")
        };
        return Err(AppError::Conflict(message));
    }

    let run = GenerationRun {
        store,
        llm,
        llm_timeout,
        user_id,
        cv_id,
        // Entitlement: free tier pays one credit, reserved up front.
        charged: profile.subscription_tier.is_free(),
        extracted_text: input.extracted_text,
        job_description: input.job_description,
        template_style: request.template_style,
        is_anonymous: request.is_anonymous,
        language: request.language,
    };

    tokio::spawn(run.execute()).await.map_err(|e| {
        AppError::Internal(anyhow::anyhow!("generation task for CV {cv_id} aborted: {e}"))
    })?
}

/// The part of a generation that owns a reserved credit and a `processing` job.
struct GenerationRun {
    store: Arc<dyn CvStore>,
    llm: Arc<dyn TextGenerator>,
    llm_timeout: Duration,
    user_id: Uuid,
    cv_id: Uuid,
    charged: bool,
    extracted_text: String,
    job_description: String,
    template_style: Option<TemplateStyle>,
    is_anonymous: Option<bool>,
    language: Option<String>,
}

impl GenerationRun {
    async fn execute(self) -> Result<GenerateCvResponse, AppError> {
        let (user_id, cv_id) = (self.user_id, self.cv_id);

        if self.charged {
            match self.store.reserve_credit(user_id).await? {
                Some(remaining) => info!(
                    "Reserved credit for user {user_id} (remaining {remaining}) on CV {cv_id}"
                ),
                None => {
                    return Err(AppError::PaymentRequired(
                        "No credits remaining. Please upgrade your plan.".to_string(),
                    ))
                }
            }
        }

        // pending → processing; losing this race means another request owns the job.
        let job = match self.store.mark_processing(user_id, cv_id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                self.refund().await?;
                return Err(AppError::Conflict(format!(
                    "CV {cv_id} is already being generated"
                )));
            }
            Err(e) => {
                if let Err(refund_err) = self.refund().await {
                    error!("CV {cv_id}: refund after failed start also failed: {refund_err}");
                }
                return Err(e);
            }
        };
        info!("CV {cv_id} for user {user_id} is processing");

        if let Some(style) = self.template_style {
            if style != job.template_style {
                warn!(
                    "CV {cv_id}: request template {:?} differs from stored {:?}; rendering uses the stored style",
                    style, job.template_style
                );
            }
        }

        let anonymize = self.is_anonymous.unwrap_or(job.is_anonymous);
        let language =
            OutputLanguage::from_code(self.language.as_deref().unwrap_or(&job.language));

        let content = match self.optimize(anonymize, language).await {
            Ok(content) => content,
            Err(message) => {
                error!("CV {cv_id} generation failed: {message}");
                self.fail(&message).await?;
                return Err(AppError::Llm(message));
            }
        };

        match self.store.mark_completed(cv_id, &content).await {
            Ok(true) => {}
            Ok(false) => {
                // The row left `processing` underneath us (e.g. deleted by its owner).
                self.refund().await?;
                return Err(AppError::Conflict(format!(
                    "CV {cv_id} is no longer processing"
                )));
            }
            Err(e) => {
                error!("CV {cv_id}: storing the result failed: {e}");
                if let Err(fail_err) = self.fail("Failed to save the generated CV").await {
                    error!("CV {cv_id}: could not mark job failed: {fail_err}");
                }
                return Err(e);
            }
        }
        info!(
            "CV {cv_id} for user {user_id} completed: atsScore={}, keywordMatch={}",
            content.ats_score, content.keyword_match_percentage
        );

        if let Err(e) = self
            .store
            .log_usage(
                user_id,
                CV_GENERATED_ACTION,
                json!({ "generated_cv_id": cv_id }),
            )
            .await
        {
            warn!("Failed to record usage for CV {cv_id}: {e}");
        }

        Ok(GenerateCvResponse {
            success: true,
            data: content,
            cv_id,
        })
    }

    /// One bounded upstream call plus parsing. The error is the human-readable
    /// message stored on the failed job.
    async fn optimize(
        &self,
        anonymize: bool,
        language: OutputLanguage,
    ) -> Result<OptimizedCvContent, String> {
        let system = optimization_system_prompt();
        let prompt = build_optimization_prompt(
            &self.extracted_text,
            &self.job_description,
            anonymize,
            language,
        );
        let request = CompletionRequest {
            system: &system,
            prompt: &prompt,
            json_only: true,
        };

        let raw = tokio::time::timeout(self.llm_timeout, self.llm.complete(&request))
            .await
            .map_err(|_| {
                format!(
                    "Generation timed out after {}s",
                    self.llm_timeout.as_secs()
                )
            })?
            .map_err(|e| e.to_string())?;

        parse_optimized_content(&raw).map_err(|e| e.to_string())
    }

    /// processing → failed, handing back the reserved credit.
    async fn fail(&self, message: &str) -> Result<(), AppError> {
        let marked = self.store.mark_failed(self.cv_id, message).await;
        let refunded = self.refund().await;
        marked?;
        refunded?;
        info!("CV {} for user {} failed", self.cv_id, self.user_id);
        Ok(())
    }

    async fn refund(&self) -> Result<(), AppError> {
        if self.charged {
            self.store.refund_credit(self.user_id).await?;
            info!("Refunded credit to user {} for CV {}", self.user_id, self.cv_id);
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
