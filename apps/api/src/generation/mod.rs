// CV generation: prompt building, the upstream call, result parsing and
// job status transitions. All LLM calls go through llm_client.

pub mod content;
pub mod generator;
pub mod handlers;
pub mod prompts;
