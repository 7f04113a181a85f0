//! Illustration Enricher: fills each worksheet visual with a generated image.
//!
//! Visuals are processed one at a time to keep pressure on the rate-limited
//! image model bounded. A failed illustration is logged and left empty; it
//! never fails the document.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::lesson::document::{GeneratedDocument, StudentWorksheet, VisualPlaceholder};
use crate::lesson::progress::{ProgressReporter, Stage};
use crate::lesson::prompts::{ILLUSTRATION_ASPECT_RATIO, ILLUSTRATION_PROMPT_TEMPLATE};
use crate::llm_client::retry::{retry_with_backoff, RetryPolicy};
use crate::llm_client::{ContentModel, ImageRequest};

pub const ILLUSTRATION_RETRY: RetryPolicy = RetryPolicy::new(3, Duration::from_millis(2000));

pub fn illustration_request(prompt: &str) -> ImageRequest {
    ImageRequest {
        prompt: ILLUSTRATION_PROMPT_TEMPLATE.replace("{prompt}", prompt.trim()),
        aspect_ratio: ILLUSTRATION_ASPECT_RATIO.to_string(),
    }
}

#[derive(Clone)]
pub struct Enricher {
    model: Arc<dyn ContentModel>,
    retry: RetryPolicy,
}

impl Enricher {
    pub fn new(model: Arc<dyn ContentModel>) -> Self {
        Self::with_retry_policy(model, ILLUSTRATION_RETRY)
    }

    pub fn with_retry_policy(model: Arc<dyn ContentModel>, retry: RetryPolicy) -> Self {
        Self { model, retry }
    }

    /// Maps the worksheet visuals to enriched copies and rebuilds the document.
    pub async fn enrich(
        &self,
        document: GeneratedDocument,
        progress: &ProgressReporter<'_>,
    ) -> GeneratedDocument {
        if document.student_worksheet.visuals.is_empty() {
            return document;
        }

        progress.report(Stage::Illustrating);

        let GeneratedDocument {
            teaching_module,
            mut student_worksheet,
            appendix,
        } = document;
        let visuals = std::mem::take(&mut student_worksheet.visuals);

        let mut enriched = Vec::with_capacity(visuals.len());
        for (index, visual) in visuals.into_iter().enumerate() {
            let image_url = self.illustrate(index, &visual.prompt).await;
            enriched.push(VisualPlaceholder { image_url, ..visual });
        }

        let missing = enriched.iter().filter(|v| v.image_url.is_none()).count();
        info!(
            "Illustrated {}/{} worksheet visuals",
            enriched.len() - missing,
            enriched.len()
        );

        GeneratedDocument {
            teaching_module,
            student_worksheet: StudentWorksheet {
                visuals: enriched,
                ..student_worksheet
            },
            appendix,
        }
    }

    /// Returns a `data:` URI, or `None` on any failure.
    async fn illustrate(&self, index: usize, prompt: &str) -> Option<String> {
        if prompt.trim().is_empty() {
            warn!("Visual {} has an empty prompt, skipping illustration", index + 1);
            return None;
        }

        let request = illustration_request(prompt);
        let label = format!("Illustration {}", index + 1);

        match retry_with_backoff(self.retry, &label, || self.model.generate_image(&request)).await
        {
            Ok(Some(image)) => Some(image.to_data_uri()),
            Ok(None) => {
                warn!("{label}: model returned no inline image");
                None
            }
            Err(e) => {
                warn!("{label} failed: {e}");
                None
            }
        }
    }
}
