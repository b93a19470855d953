//! The fixed-shape JSON object the generation model must return.
//!
//! Wire names are camelCase; this struct is stored verbatim in
//! `generated_cvs.optimized_content` and returned to the client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::strip_json_fences;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedCvContent {
    pub contact: Contact,
    pub summary: String,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub skills: Skills,
    /// 0..=100
    pub ats_score: f64,
    /// 0..=100
    pub keyword_match_percentage: f64,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    pub linkedin: Option<String>,
    pub portfolio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub graduation_date: String,
    pub gpa: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default)]
    pub technical: Vec<String>,
    #[serde(default)]
    pub soft: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("generation output is not valid CV JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} must be between 0 and 100, got {value}")]
    ScoreOutOfRange { field: &'static str, value: f64 },

    #[error("generation output has an empty professional summary")]
    EmptySummary,
}

/// Parses raw model output into `OptimizedCvContent`.
///
/// Anything short of a complete, in-range object is an error; there is no
/// partial result.
pub fn parse_optimized_content(raw: &str) -> Result<OptimizedCvContent, ContentError> {
    let content: OptimizedCvContent = serde_json::from_str(strip_json_fences(raw))?;
    content.validate()?;
    Ok(content)
}

impl OptimizedCvContent {
    pub fn validate(&self) -> Result<(), ContentError> {
        check_percentage("atsScore", self.ats_score)?;
        check_percentage("keywordMatchPercentage", self.keyword_match_percentage)?;
        if self.summary.trim().is_empty() {
            return Err(ContentError::EmptySummary);
        }
        Ok(())
    }
}

fn check_percentage(field: &'static str, value: f64) -> Result<(), ContentError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ContentError::ScoreOutOfRange { field, value })
    }
}
