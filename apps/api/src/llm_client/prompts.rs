// Cross-cutting prompt fragments shared by every generation prompt.

/// Closing instruction that enforces JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "Return ONLY valid JSON, no markdown or explanation";

/// Truthfulness guard placed at the top of every rewriting prompt.
pub const TRUTHFULNESS_RULES: &str = "\
1. NEVER invent or fabricate experience, skills, or qualifications
2. ONLY enhance, reorganize, and rephrase existing content
3. Match terminology to the job description where the candidate has equivalent skills
4. Quantify achievements using numbers from the original CV or reasonable estimates based on context
5. Use ATS-friendly formatting with standard section headers";
