//! Lesson pipeline: the single entry point for generating a lesson.
//!
//! Flow: build_prompt → Generator::generate (retried on rate limits) →
//!       Enricher::enrich (each visual retried on its own) → document.

use std::sync::Arc;

use tracing::info;

use crate::lesson::document::GeneratedDocument;
use crate::lesson::enricher::Enricher;
use crate::lesson::generator::{GenerationError, Generator};
use crate::lesson::models::GenerationRequest;
use crate::lesson::progress::{ProgressReporter, Stage};
use crate::lesson::prompt_builder::build_prompt;
use crate::llm_client::ContentModel;

/// Holds no per-request state; one instance serves concurrent requests.
#[derive(Clone)]
pub struct LessonPipeline {
    generator: Generator,
    enricher: Enricher,
}

impl LessonPipeline {
    pub fn new(model: Arc<dyn ContentModel>) -> Self {
        Self {
            generator: Generator::new(model.clone()),
            enricher: Enricher::new(model),
        }
    }

    pub async fn generate_lesson(
        &self,
        request: &GenerationRequest,
        progress: &ProgressReporter<'_>,
    ) -> Result<GeneratedDocument, GenerationError> {
        progress.report(Stage::PreparingPrompt);
        info!(
            "Generating lesson: subject={:?}, topic={:?}, grade={:?}",
            request.subject, request.topic, request.grade
        );

        let payload = build_prompt(request);
        let document = self.generator.generate(&payload, progress).await?;
        Ok(self.enricher.enrich(document, progress).await)
    }
}
