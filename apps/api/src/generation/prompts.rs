// Prompt constants for CV optimization.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, TRUTHFULNESS_RULES};
use crate::models::cv::OutputLanguage;

/// System prompt template. Replace `{truthfulness_rules}` before sending
/// (see `optimization_system_prompt`).
const CV_OPTIMIZATION_SYSTEM_TEMPLATE: &str = r#"You are an expert ATS (Applicant Tracking System) optimization specialist and professional resume writer with 15+ years of experience in HR and recruitment.

Your task is to optimize a candidate's CV/resume for a specific job posting while maintaining authenticity and truthfulness.

## CRITICAL RULES:
{truthfulness_rules}

## OUTPUT FORMAT:
Return a JSON object with this exact structure:
{
  "contact": {
    "name": "string",
    "email": "string",
    "phone": "string",
    "location": "string",
    "linkedin": "string | null",
    "portfolio": "string | null"
  },
  "summary": "string (2-4 sentences, tailored to job)",
  "experience": [
    {
      "title": "string",
      "company": "string",
      "location": "string",
      "startDate": "string (Month Year)",
      "endDate": "string (Month Year or Present)",
      "highlights": ["string (achievement-focused bullet points)"]
    }
  ],
  "education": [
    {
      "degree": "string",
      "institution": "string",
      "location": "string",
      "graduationDate": "string",
      "gpa": "string | null",
      "highlights": ["string"]
    }
  ],
  "skills": {
    "technical": ["string"],
    "soft": ["string"],
    "languages": ["string"],
    "certifications": ["string"]
  },
  "atsScore": number (0-100),
  "keywordMatchPercentage": number (0-100),
  "matchedKeywords": ["string"],
  "missingKeywords": ["string"],
  "suggestions": ["string (actionable improvement tips)"]
}

## OPTIMIZATION STRATEGY:
1. Professional Summary: Write a compelling 2-4 sentence summary highlighting the most relevant experience for this specific role
2. Experience: Reorder to prioritize most relevant roles, rewrite bullets to match job keywords, use action verbs, quantify results
3. Skills: Reorganize to put job-relevant skills first, match exact terminology from job description
4. Keywords: Naturally incorporate keywords from the job description throughout the CV
5. ATS Compliance: Use standard headers, no special characters, clean formatting"#;

/// User prompt template.
/// Replace: {original_cv}, {job_description}, {instructions}
const CV_OPTIMIZATION_PROMPT_TEMPLATE: &str = r#"## ORIGINAL CV:
{original_cv}

## TARGET JOB DESCRIPTION:
{job_description}

## INSTRUCTIONS:
{instructions}"#;

const ANONYMIZE_INSTRUCTION: &str = "- Replace name with \"[CANDIDATE NAME]\", email with \"[EMAIL]\", \
    phone with \"[PHONE]\", location with \"[LOCATION]\"";

/// Full system instruction: ATS persona plus the JSON schema contract.
pub fn optimization_system_prompt() -> String {
    CV_OPTIMIZATION_SYSTEM_TEMPLATE.replace("{truthfulness_rules}", TRUTHFULNESS_RULES)
}

/// Builds the user message for one optimization call.
pub fn build_optimization_prompt(
    original_cv: &str,
    job_description: &str,
    anonymize: bool,
    language: OutputLanguage,
) -> String {
    let mut instructions = Vec::with_capacity(4);
    if anonymize {
        instructions.push(ANONYMIZE_INSTRUCTION.to_string());
    }
    instructions.push(format!("- Output language: {}", language.name()));
    instructions.push(
        "- Optimize this CV for the target job while following all rules above".to_string(),
    );
    instructions.push(format!("- {JSON_ONLY_INSTRUCTION}"));

    CV_OPTIMIZATION_PROMPT_TEMPLATE
        .replace("{original_cv}", original_cv.trim())
        .replace("{job_description}", job_description.trim())
        .replace("{instructions}", &instructions.join("\n"))
}
