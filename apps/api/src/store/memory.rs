//! In-memory `CvStore` for handler and pipeline tests.
//! Applies the same conditional rules as the SQL in `postgres.rs`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use sqlx::types::Json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::content::OptimizedCvContent;
use crate::models::cv::{CvStatus, GeneratedCvRow, TemplateStyle};
use crate::models::document::{DocumentRow, DocumentType};
use crate::models::user::{Profile, SubscriptionTier};
use crate::store::{CvListFilter, CvStore, NewDocument, NewGeneratedCv};

#[derive(Debug, Clone)]
pub struct UsageEntry {
    pub user_id: Uuid,
    pub action: String,
    pub metadata: Value,
}

#[derive(Default)]
struct Tables {
    profiles: HashMap<Uuid, Profile>,
    documents: HashMap<Uuid, DocumentRow>,
    cvs: HashMap<Uuid, GeneratedCvRow>,
    usage: Vec<UsageEntry>,
}

#[derive(Default)]
pub struct MemoryCvStore {
    tables: Mutex<Tables>,
    writes: AtomicUsize,
    fail_completion: AtomicBool,
}

impl MemoryCvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_profile(&self, tier: SubscriptionTier, credits: i32) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.tables.lock().unwrap().profiles.insert(
            id,
            Profile {
                id,
                email: format!("{id}@example.com"),
                full_name: None,
                subscription_tier: tier,
                credits_remaining: credits,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    /// Inserts a pending job with a usable description.
    pub fn add_pending_cv(&self, user_id: Uuid) -> Uuid {
        self.add_cv(user_id, CvStatus::Pending, Some("Backend Engineer"), Some("Acme"))
    }

    pub fn add_cv(
        &self,
        user_id: Uuid,
        status: CvStatus,
        job_title: Option<&str>,
        job_company: Option<&str>,
    ) -> Uuid {
        let mut tables = self.tables.lock().unwrap();
        let id = Uuid::new_v4();
        // Strictly increasing timestamps keep "newest first" deterministic.
        let created_at = Utc::now() + Duration::milliseconds(tables.cvs.len() as i64);
        tables.cvs.insert(
            id,
            GeneratedCvRow {
                id,
                user_id,
                source_document_id: None,
                job_title: job_title.map(str::to_string),
                job_company: job_company.map(str::to_string),
                job_description: "We are looking for a backend engineer with Rust and PostgreSQL experience.".to_string(),
                job_url: None,
                template_style: TemplateStyle::Professional,
                is_anonymous: false,
                language: "en".to_string(),
                optimized_content: None,
                ats_score: None,
                keyword_match_percentage: None,
                suggestions: None,
                status,
                error_message: None,
                processing_started_at: None,
                processing_completed_at: None,
                created_at,
            },
        );
        id
    }

    pub fn credits(&self, user_id: Uuid) -> i32 {
        self.tables.lock().unwrap().profiles[&user_id].credits_remaining
    }

    pub fn cv(&self, id: Uuid) -> GeneratedCvRow {
        self.tables.lock().unwrap().cvs[&id].clone()
    }

    pub fn usage(&self) -> Vec<UsageEntry> {
        self.tables.lock().unwrap().usage.clone()
    }

    /// Number of mutating calls that changed something.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes the next `mark_completed` return a database-style error.
    pub fn fail_next_completion(&self) {
        self.fail_completion.store(true, Ordering::SeqCst);
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn transition(
        &self,
        id: Uuid,
        next: CvStatus,
        apply: impl FnOnce(&mut GeneratedCvRow),
    ) -> bool {
        let moved = {
            let mut tables = self.tables.lock().unwrap();
            match tables.cvs.get_mut(&id) {
                Some(row) if row.status.can_transition_to(next) => {
                    row.status = next;
                    apply(row);
                    true
                }
                _ => false,
            }
        };
        if moved {
            self.record_write();
        }
        moved
    }
}

#[async_trait]
impl CvStore for MemoryCvStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(self.tables.lock().unwrap().profiles.get(&user_id).cloned())
    }

    async fn update_profile_name(
        &self,
        user_id: Uuid,
        full_name: Option<String>,
    ) -> Result<Option<Profile>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let updated = tables.profiles.get_mut(&user_id).map(|p| {
            p.full_name = full_name;
            p.updated_at = Utc::now();
            p.clone()
        });
        drop(tables);
        if updated.is_some() {
            self.record_write();
        }
        Ok(updated)
    }

    async fn reserve_credit(&self, user_id: Uuid) -> Result<Option<i32>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let remaining = match tables.profiles.get_mut(&user_id) {
            Some(p) if p.credits_remaining > 0 => {
                p.credits_remaining -= 1;
                Some(p.credits_remaining)
            }
            _ => None,
        };
        drop(tables);
        if remaining.is_some() {
            self.record_write();
        }
        Ok(remaining)
    }

    async fn refund_credit(&self, user_id: Uuid) -> Result<(), AppError> {
        if let Some(p) = self.tables.lock().unwrap().profiles.get_mut(&user_id) {
            p.credits_remaining += 1;
        }
        self.record_write();
        Ok(())
    }

    async fn insert_document(&self, document: NewDocument) -> Result<DocumentRow, AppError> {
        let row = DocumentRow {
            id: document.id,
            user_id: document.user_id,
            file_name: document.file_name,
            file_path: document.file_path,
            file_size: Some(document.file_size),
            mime_type: Some(document.mime_type),
            extracted_text: document.extracted_text,
            document_type: document.document_type,
            created_at: Utc::now(),
        };
        self.tables
            .lock()
            .unwrap()
            .documents
            .insert(row.id, row.clone());
        self.record_write();
        Ok(row)
    }

    async fn get_document(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<DocumentRow>, AppError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .documents
            .get(&id)
            .filter(|d| d.user_id == user_id)
            .cloned())
    }

    async fn insert_cv(&self, cv: NewGeneratedCv) -> Result<GeneratedCvRow, AppError> {
        let id = self.add_cv(
            cv.user_id,
            CvStatus::Pending,
            cv.job_title.as_deref(),
            cv.job_company.as_deref(),
        );
        let mut tables = self.tables.lock().unwrap();
        let row = tables.cvs.get_mut(&id).map(|row| {
            row.source_document_id = cv.source_document_id;
            row.job_description = cv.job_description;
            row.job_url = cv.job_url;
            row.template_style = cv.template_style;
            row.is_anonymous = cv.is_anonymous;
            row.language = cv.language;
            row.clone()
        });
        drop(tables);
        self.record_write();
        row.ok_or_else(|| AppError::Internal(anyhow::anyhow!("inserted CV {id} vanished")))
    }

    async fn get_cv(&self, user_id: Uuid, id: Uuid) -> Result<Option<GeneratedCvRow>, AppError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .cvs
            .get(&id)
            .filter(|cv| cv.user_id == user_id)
            .cloned())
    }

    async fn list_cvs(
        &self,
        user_id: Uuid,
        filter: &CvListFilter,
    ) -> Result<Vec<GeneratedCvRow>, AppError> {
        let query = filter
            .query
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());
        let matches_query = |field: &Option<String>| match (&query, field) {
            (Some(q), Some(value)) => value.to_lowercase().contains(q.as_str()),
            _ => false,
        };

        let mut rows: Vec<GeneratedCvRow> = self
            .tables
            .lock()
            .unwrap()
            .cvs
            .values()
            .filter(|cv| cv.user_id == user_id)
            .filter(|cv| filter.status.map_or(true, |s| cv.status == s))
            .filter(|cv| {
                query.is_none() || matches_query(&cv.job_title) || matches_query(&cv.job_company)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = filter.limit {
            rows.truncate(limit.max(0) as usize);
        }
        Ok(rows)
    }

    async fn count_cvs(&self, user_id: Uuid) -> Result<i64, AppError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .cvs
            .values()
            .filter(|cv| cv.user_id == user_id)
            .count() as i64)
    }

    async fn delete_cv(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let owned = tables.cvs.get(&id).is_some_and(|cv| cv.user_id == user_id);
        if owned {
            tables.cvs.remove(&id);
            drop(tables);
            self.record_write();
        }
        Ok(owned)
    }

    async fn mark_processing(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<GeneratedCvRow>, AppError> {
        let owned = self
            .tables
            .lock()
            .unwrap()
            .cvs
            .get(&id)
            .is_some_and(|cv| cv.user_id == user_id);
        if !owned {
            return Ok(None);
        }
        let moved = self.transition(id, CvStatus::Processing, |row| {
            row.processing_started_at = Some(Utc::now());
        });
        Ok(moved.then(|| self.cv(id)))
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        content: &OptimizedCvContent,
    ) -> Result<bool, AppError> {
        if self.fail_completion.swap(false, Ordering::SeqCst) {
            return Err(AppError::Internal(anyhow::anyhow!("connection reset while saving CV {id}")));
        }
        Ok(self.transition(id, CvStatus::Completed, |row| {
            row.optimized_content = Some(Json(content.clone()));
            row.ats_score = Some(content.ats_score);
            row.keyword_match_percentage = Some(content.keyword_match_percentage);
            row.suggestions = Some(content.suggestions.clone());
            row.error_message = None;
            row.processing_completed_at = Some(Utc::now());
        }))
    }

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> Result<bool, AppError> {
        Ok(self.transition(id, CvStatus::Failed, |row| {
            row.error_message = Some(error_message.to_string());
            row.processing_completed_at = Some(Utc::now());
        }))
    }

    async fn log_usage(
        &self,
        user_id: Uuid,
        action: &str,
        metadata: Value,
    ) -> Result<(), AppError> {
        self.tables.lock().unwrap().usage.push(UsageEntry {
            user_id,
            action: action.to_string(),
            metadata,
        });
        self.record_write();
        Ok(())
    }
}

impl MemoryCvStore {
    pub fn add_document(&self, user_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.tables.lock().unwrap().documents.insert(
            id,
            DocumentRow {
                id,
                user_id,
                file_name: "resume.txt".to_string(),
                file_path: format!("documents/{user_id}/{id}/resume.txt"),
                file_size: Some(64),
                mime_type: Some("text/plain".to_string()),
                extracted_text: Some("Experienced backend engineer".to_string()),
                document_type: DocumentType::Cv,
                created_at: Utc::now(),
            },
        );
        id
    }
}
