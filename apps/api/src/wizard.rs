//! Client-side state for the four-step "create CV" flow.
//!
//! The wizard owns everything the user enters before submission and builds
//! the two request bodies the flow sends: `POST /api/v1/cvs` to create the
//! pending job, then `POST /api/v1/generate-cv` to run it. The server never
//! drives it.
#![allow(dead_code)]

use uuid::Uuid;

use crate::cvs::handlers::CreateCvRequest;
use crate::generation::generator::GenerateCvRequest;
use crate::models::cv::{OutputLanguage, TemplateStyle};

/// Shortest job description, in trimmed characters, before the wizard lets
/// the user leave the job details step.
const MIN_DESCRIPTION_TO_PROCEED: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    #[default]
    Upload,
    JobDetails,
    Preferences,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Upload,
        WizardStep::JobDetails,
        WizardStep::Preferences,
        WizardStep::Review,
    ];

    /// 1-based position, as shown in the step indicator.
    pub fn number(self) -> usize {
        self as usize + 1
    }

    fn next(self) -> Self {
        match self {
            WizardStep::Upload => WizardStep::JobDetails,
            WizardStep::JobDetails => WizardStep::Preferences,
            WizardStep::Preferences | WizardStep::Review => WizardStep::Review,
        }
    }

    fn prev(self) -> Self {
        match self {
            WizardStep::Upload | WizardStep::JobDetails => WizardStep::Upload,
            WizardStep::Preferences => WizardStep::JobDetails,
            WizardStep::Review => WizardStep::Preferences,
        }
    }
}

/// The file picked in the upload step, after `POST /api/v1/documents`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub document_id: Option<Uuid>,
    pub file_name: String,
    pub file_size: u64,
}

#[derive(Debug, Clone, Default)]
pub struct CvWizard {
    step: WizardStep,
    pub uploaded_file: Option<UploadedFile>,
    pub extracted_text: String,
    pub job_title: String,
    pub job_company: String,
    pub job_description: String,
    pub job_url: String,
    pub template_style: TemplateStyle,
    pub is_anonymous: bool,
    pub language: OutputLanguage,
}

impl CvWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn can_proceed(&self) -> bool {
        match self.step {
            WizardStep::Upload => {
                self.uploaded_file.is_some() && !self.extracted_text.trim().is_empty()
            }
            WizardStep::JobDetails => {
                self.job_description.trim().chars().count() > MIN_DESCRIPTION_TO_PROCEED
            }
            WizardStep::Preferences | WizardStep::Review => true,
        }
    }

    /// Advances one step if the current one is complete. Returns whether it moved.
    pub fn next(&mut self) -> bool {
        if !self.can_proceed() || self.step == WizardStep::Review {
            return false;
        }
        self.step = self.step.next();
        true
    }

    pub fn prev(&mut self) {
        self.step = self.step.prev();
    }

    /// Jumps back to an earlier step from the step indicator. Forward jumps
    /// are ignored so no step can be skipped.
    pub fn go_to(&mut self, step: WizardStep) -> bool {
        if step < self.step {
            self.step = step;
            true
        } else {
            false
        }
    }

    pub fn progress_percent(&self) -> u8 {
        (self.step.number() * 100 / WizardStep::ALL.len()) as u8
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Body for creating the pending job.
    pub fn create_request(&self) -> CreateCvRequest {
        CreateCvRequest {
            source_document_id: self.uploaded_file.as_ref().and_then(|f| f.document_id),
            job_title: optional(&self.job_title),
            job_company: optional(&self.job_company),
            job_description: self.job_description.trim().to_string(),
            job_url: optional(&self.job_url),
            template_style: self.template_style,
            is_anonymous: self.is_anonymous,
            language: Some(self.language.code().to_string()),
        }
    }

    /// Body for running generation on the job created from `create_request`.
    pub fn generate_request(&self, cv_id: Uuid) -> GenerateCvRequest {
        GenerateCvRequest {
            generated_cv_id: Some(cv_id),
            extracted_text: Some(self.extracted_text.clone()),
            job_description: Some(self.job_description.trim().to_string()),
            template_style: Some(self.template_style),
            is_anonymous: Some(self.is_anonymous),
            language: Some(self.language.code().to_string()),
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTION: &str =
        "Backend engineer for payments: Rust, Postgres, Kafka, on-call rotation, mentoring.";

    fn uploaded() -> CvWizard {
        CvWizard {
            uploaded_file: Some(UploadedFile {
                document_id: Some(Uuid::nil()),
                file_name: "resume.txt".into(),
                file_size: 2048,
            }),
            extracted_text: "Jane Doe, backend engineer".into(),
            ..CvWizard::new()
        }
    }

    #[test]
    fn test_upload_step_needs_file_and_text() {
        let mut wizard = CvWizard::new();
        assert!(!wizard.can_proceed());
        assert!(!wizard.next());

        wizard.uploaded_file = uploaded().uploaded_file;
        wizard.extracted_text = "   ".into();
        assert!(!wizard.next());
        assert_eq!(wizard.step(), WizardStep::Upload);

        wizard.extracted_text = "Jane Doe".into();
        assert!(wizard.next());
        assert_eq!(wizard.step(), WizardStep::JobDetails);
    }

    #[test]
    fn test_job_details_needs_more_than_fifty_chars() {
        let mut wizard = uploaded();
        wizard.next();

        wizard.job_description = format!("  {}  ", "x".repeat(50));
        assert!(!wizard.can_proceed());

        wizard.job_description = "x".repeat(51);
        assert!(wizard.next());
        assert_eq!(wizard.step(), WizardStep::Preferences);
    }

    #[test]
    fn test_next_clamps_at_review_and_prev_at_upload() {
        let mut wizard = uploaded();
        wizard.job_description = DESCRIPTION.into();
        while wizard.next() {}
        assert_eq!(wizard.step(), WizardStep::Review);
        assert_eq!(wizard.progress_percent(), 100);

        for _ in 0..6 {
            wizard.prev();
        }
        assert_eq!(wizard.step(), WizardStep::Upload);
        assert_eq!(wizard.progress_percent(), 25);
    }

    #[test]
    fn test_go_to_only_moves_backwards() {
        let mut wizard = uploaded();
        wizard.job_description = DESCRIPTION.into();
        wizard.next();
        wizard.next();
        assert_eq!(wizard.step(), WizardStep::Preferences);

        assert!(!wizard.go_to(WizardStep::Review));
        assert!(wizard.go_to(WizardStep::Upload));
        assert_eq!(wizard.step(), WizardStep::Upload);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut wizard = uploaded();
        wizard.job_description = DESCRIPTION.into();
        wizard.is_anonymous = true;
        wizard.next();

        wizard.reset();

        assert_eq!(wizard.step(), WizardStep::Upload);
        assert!(wizard.uploaded_file.is_none());
        assert!(wizard.job_description.is_empty());
        assert!(!wizard.is_anonymous);
    }

    #[test]
    fn test_request_bodies_carry_wizard_fields() {
        let mut wizard = uploaded();
        wizard.job_title = " Staff Engineer ".into();
        wizard.job_company = "".into();
        wizard.job_description = format!("{DESCRIPTION}\n");
        wizard.template_style = TemplateStyle::Modern;
        wizard.is_anonymous = true;
        wizard.language = OutputLanguage::French;

        let create = wizard.create_request();
        assert_eq!(create.source_document_id, Some(Uuid::nil()));
        assert_eq!(create.job_title.as_deref(), Some("Staff Engineer"));
        assert_eq!(create.job_company, None);
        assert_eq!(create.job_description, DESCRIPTION);
        assert_eq!(create.language.as_deref(), Some("fr"));

        let cv_id = Uuid::new_v4();
        let body = serde_json::to_value(wizard.generate_request(cv_id)).unwrap();
        assert_eq!(body["generatedCvId"], cv_id.to_string());
        assert_eq!(body["extractedText"], "Jane Doe, backend engineer");
        assert_eq!(body["templateStyle"], "modern");
        assert_eq!(body["isAnonymous"], true);
        assert_eq!(body["language"], "fr");
    }
}
