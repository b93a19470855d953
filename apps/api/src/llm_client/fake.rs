//! Scripted `TextGenerator` for tests. Records every prompt it receives.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{CompletionRequest, LlmError, TextGenerator};

#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    ApiError { status: u16, message: String },
    Empty,
    /// Never answers; only a timeout or cancellation ends the call.
    Hang,
}

pub struct FakeGenerator {
    reply: Reply,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn replying(reply: Reply) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_text(text: &str) -> Self {
        Self::replying(Reply::Text(text.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(request.prompt.to_string());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::ApiError { status, message } => Err(LlmError::Api {
                status: *status,
                message: message.clone(),
            }),
            Reply::Empty => Err(LlmError::EmptyContent),
            Reply::Hang => std::future::pending().await,
        }
    }
}
