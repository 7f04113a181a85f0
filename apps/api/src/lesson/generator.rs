//! Schema-Constrained Generator: one structured call to the text model,
//! parsed into a `GeneratedDocument`.
//!
//! Only the model call sits inside the retrier. An empty payload or a payload
//! that does not fit the schema fails immediately: retrying would not help.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::lesson::document::GeneratedDocument;
use crate::lesson::prompt_builder::PromptPayload;
use crate::lesson::progress::{ProgressReporter, Stage};
use crate::lesson::schema::{lesson_schema, SCHEMA_VERSION};
use crate::llm_client::retry::{is_rate_limited, retry_with_backoff, RateLimitSignal, RetryPolicy};
use crate::llm_client::{strip_json_fences, ContentModel, LlmError, StructuredRequest};

pub const GENERATION_RETRY: RetryPolicy = RetryPolicy::new(5, Duration::from_millis(3500));

/// Failure of a lesson generation. The single error callers see.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Model response did not match the lesson schema: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RateLimitSignal for GenerationError {
    fn status(&self) -> Option<u16> {
        match self {
            GenerationError::Model(e) => e.status(),
            _ => None,
        }
    }

    fn code(&self) -> Option<i64> {
        match self {
            GenerationError::Model(e) => e.code(),
            _ => None,
        }
    }

    fn has_provider_message(&self) -> bool {
        match self {
            GenerationError::Model(e) => e.has_provider_message(),
            _ => false,
        }
    }
}

impl GenerationError {
    /// Canonical rate-limit classification for user-facing messaging.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            GenerationError::Model(_) => is_rate_limited(self),
            GenerationError::EmptyResponse | GenerationError::Parse(_) => false,
        }
    }
}

#[derive(Clone)]
pub struct Generator {
    model: Arc<dyn ContentModel>,
    retry: RetryPolicy,
}

impl Generator {
    pub fn new(model: Arc<dyn ContentModel>) -> Self {
        Self::with_retry_policy(model, GENERATION_RETRY)
    }

    pub fn with_retry_policy(model: Arc<dyn ContentModel>, retry: RetryPolicy) -> Self {
        Self { model, retry }
    }

    pub async fn generate(
        &self,
        payload: &PromptPayload,
        progress: &ProgressReporter<'_>,
    ) -> Result<GeneratedDocument, GenerationError> {
        progress.report(Stage::Generating);

        let request = StructuredRequest {
            instruction: payload.instruction.clone(),
            attachments: payload.attachments.clone(),
            response_schema: lesson_schema(),
        };

        info!(
            "Requesting lesson document (schema v{}, {} attachments)",
            SCHEMA_VERSION,
            request.attachments.len()
        );

        let text = retry_with_backoff(self.retry, "Lesson generation", || {
            self.model.generate_structured(&request)
        })
        .await?
        .ok_or(GenerationError::EmptyResponse)?;

        let document: GeneratedDocument = serde_json::from_str(strip_json_fences(&text))?;

        info!(
            "Lesson document parsed: {} objectives, {} visuals",
            document.teaching_module.learning_objectives.len(),
            document.student_worksheet.visuals.len()
        );

        Ok(document)
    }
}
