use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::content::OptimizedCvContent;
use crate::models::cv::GeneratedCvRow;
use crate::models::document::DocumentRow;
use crate::models::user::Profile;
use crate::store::{like_pattern, CvListFilter, CvStore, NewDocument, NewGeneratedCv};

const DEFAULT_LIST_LIMIT: i64 = 100;

/// `CvStore` backed by PostgreSQL.
#[derive(Clone)]
pub struct PgCvStore {
    pool: PgPool,
}

impl PgCvStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CvStore for PgCvStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn update_profile_name(
        &self,
        user_id: Uuid,
        full_name: Option<String>,
    ) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET full_name = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(full_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn reserve_credit(&self, user_id: Uuid) -> Result<Option<i32>, AppError> {
        // Single conditional decrement: concurrent reservations cannot overdraw.
        let remaining: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE profiles
            SET credits_remaining = credits_remaining - 1, updated_at = now()
            WHERE id = $1 AND credits_remaining > 0
            RETURNING credits_remaining
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(remaining)
    }

    async fn refund_credit(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE profiles SET credits_remaining = credits_remaining + 1, updated_at = now() WHERE id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_document(&self, document: NewDocument) -> Result<DocumentRow, AppError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents
                (id, user_id, file_name, file_path, file_size, mime_type, extracted_text, document_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(document.id)
        .bind(document.user_id)
        .bind(&document.file_name)
        .bind(&document.file_path)
        .bind(document.file_size)
        .bind(&document.mime_type)
        .bind(&document.extracted_text)
        .bind(document.document_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_document(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<DocumentRow>, AppError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT * FROM documents WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_cv(&self, cv: NewGeneratedCv) -> Result<GeneratedCvRow, AppError> {
        let row = sqlx::query_as::<_, GeneratedCvRow>(
            r#"
            INSERT INTO generated_cvs
                (id, user_id, source_document_id, job_title, job_company, job_description,
                 job_url, template_style, is_anonymous, language, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pending')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(cv.user_id)
        .bind(cv.source_document_id)
        .bind(&cv.job_title)
        .bind(&cv.job_company)
        .bind(&cv.job_description)
        .bind(&cv.job_url)
        .bind(cv.template_style)
        .bind(cv.is_anonymous)
        .bind(&cv.language)
        .fetch_one(&self.pool)
        .await?;

        info!("Created CV job {} for user {}", row.id, row.user_id);
        Ok(row)
    }

    async fn get_cv(&self, user_id: Uuid, id: Uuid) -> Result<Option<GeneratedCvRow>, AppError> {
        let row = sqlx::query_as::<_, GeneratedCvRow>(
            "SELECT * FROM generated_cvs WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_cvs(
        &self,
        user_id: Uuid,
        filter: &CvListFilter,
    ) -> Result<Vec<GeneratedCvRow>, AppError> {
        let pattern = filter
            .query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .map(like_pattern);

        let rows = sqlx::query_as::<_, GeneratedCvRow>(
            r#"
            SELECT * FROM generated_cvs
            WHERE user_id = $1
              AND ($2::cv_status IS NULL OR status = $2)
              AND ($3::text IS NULL OR job_title ILIKE $3 OR job_company ILIKE $3)
            ORDER BY created_at DESC
            LIMIT $4
            "#,
        )
        .bind(user_id)
        .bind(filter.status)
        .bind(pattern)
        .bind(filter.limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_cvs(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM generated_cvs WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn delete_cv(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM generated_cvs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_processing(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<GeneratedCvRow>, AppError> {
        let row = sqlx::query_as::<_, GeneratedCvRow>(
            r#"
            UPDATE generated_cvs
            SET status = 'processing', processing_started_at = now()
            WHERE id = $1 AND user_id = $2 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        content: &OptimizedCvContent,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE generated_cvs
            SET optimized_content = $2,
                ats_score = $3,
                keyword_match_percentage = $4,
                suggestions = $5,
                status = 'completed',
                error_message = NULL,
                processing_completed_at = now()
            WHERE id = $1 AND status = 'processing'
            "#,
        )
        .bind(id)
        .bind(Json(content))
        .bind(content.ats_score)
        .bind(content.keyword_match_percentage)
        .bind(&content.suggestions)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE generated_cvs
            SET status = 'failed', error_message = $2, processing_completed_at = now()
            WHERE id = $1 AND status = 'processing'
            "#,
        )
        .bind(id)
        .bind(error_message)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn log_usage(
        &self,
        user_id: Uuid,
        action: &str,
        metadata: Value,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT INTO usage_logs (user_id, action, metadata) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(action)
            .bind(metadata)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
