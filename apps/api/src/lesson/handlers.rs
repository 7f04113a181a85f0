//! Axum route handlers for the Lesson API.

use axum::{extract::State, Json};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::lesson::document::GeneratedDocument;
use crate::lesson::models::{Attachment, GenerationRequest};
use crate::lesson::progress::ProgressReporter;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateLessonRequest {
    #[serde(default)]
    pub school: String,
    pub subject: String,
    pub topic: String,
    pub grade: String,
    pub duration: String,
    #[serde(default)]
    pub pillars: Vec<String>,
    #[serde(default)]
    pub instructional_model: String,
    #[serde(default)]
    pub teaching_method: String,
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentUpload>,
}

/// A reference file as the browser sends it: base64 without the `data:` prefix.
#[derive(Debug, Deserialize)]
pub struct AttachmentUpload {
    pub name: String,
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateLessonResponse {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub document: GeneratedDocument,
    pub missing_illustrations: usize,
}

impl TryFrom<GenerateLessonRequest> for GenerationRequest {
    type Error = AppError;

    fn try_from(body: GenerateLessonRequest) -> Result<Self, Self::Error> {
        for (field, value) in [
            ("subject", &body.subject),
            ("topic", &body.topic),
            ("grade", &body.grade),
            ("duration", &body.duration),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{field} cannot be empty")));
            }
        }

        let attachments = body
            .attachments
            .into_iter()
            .map(decode_attachment)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GenerationRequest {
            school: body.school,
            subject: body.subject,
            topic: body.topic,
            grade: body.grade,
            duration: body.duration,
            pillars: body.pillars,
            instructional_model: body.instructional_model,
            teaching_method: body.teaching_method,
            special_instructions: body.special_instructions,
            attachments,
        })
    }
}

fn decode_attachment(upload: AttachmentUpload) -> Result<Attachment, AppError> {
    if upload.mime_type.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "Attachment '{}' is missing a mime_type",
            upload.name
        )));
    }
    let data = BASE64.decode(upload.data.trim().as_bytes()).map_err(|e| {
        AppError::Validation(format!("Attachment '{}' is not valid base64: {e}", upload.name))
    })?;
    Ok(Attachment {
        name: upload.name,
        mime_type: upload.mime_type,
        data: Bytes::from(data),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/lessons/generate
///
/// Full pipeline: prompt → schema-constrained generation → illustration enrichment.
/// Blocks until the document is complete; illustration failures are reported
/// through `missing_illustrations`, not as errors.
pub async fn handle_generate_lesson(
    State(state): State<AppState>,
    Json(body): Json<GenerateLessonRequest>,
) -> Result<Json<GenerateLessonResponse>, AppError> {
    let request = GenerationRequest::try_from(body)?;
    let request_id = Uuid::new_v4();

    let log_stage = |stage: &str| info!("{stage}");
    let progress = ProgressReporter::new(&log_stage);

    let span = tracing::info_span!("generate_lesson", %request_id);
    let document = state
        .lessons
        .generate_lesson(&request, &progress)
        .instrument(span)
        .await?;

    let missing_illustrations = document.missing_illustrations();
    info!(
        "Lesson {} generated ({} illustrations missing)",
        request_id, missing_illustrations
    );

    Ok(Json(GenerateLessonResponse {
        request_id,
        generated_at: Utc::now(),
        document,
        missing_illustrations,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> GenerateLessonRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_minimal_body_converts_with_defaults() {
        let request = GenerationRequest::try_from(body(json!({
            "subject": "Civics",
            "topic": "Norms",
            "grade": "Grade 6",
            "duration": "2x35min"
        })))
        .unwrap();

        assert_eq!(request.subject, "Civics");
        assert!(request.school.is_empty());
        assert!(request.pillars.is_empty());
        assert!(request.attachments.is_empty());
        assert!(request.special_instructions.is_none());
    }

    #[test]
    fn test_blank_required_field_is_rejected() {
        let result = GenerationRequest::try_from(body(json!({
            "subject": "Civics",
            "topic": "   ",
            "grade": "Grade 6",
            "duration": "2x35min"
        })));
        match result {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "topic cannot be empty"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_attachments_are_decoded_to_raw_bytes() {
        let request = GenerationRequest::try_from(body(json!({
            "subject": "Civics",
            "topic": "Norms",
            "grade": "Grade 6",
            "duration": "2x35min",
            "attachments": [
                {"name": "silabus.pdf", "mime_type": "application/pdf", "data": "JVBERg=="}
            ]
        })))
        .unwrap();

        assert_eq!(request.attachments.len(), 1);
        assert_eq!(request.attachments[0].name, "silabus.pdf");
        assert_eq!(request.attachments[0].data, Bytes::from_static(b"%PDF"));
    }

    #[test]
    fn test_invalid_base64_attachment_is_rejected() {
        let result = GenerationRequest::try_from(body(json!({
            "subject": "Civics",
            "topic": "Norms",
            "grade": "Grade 6",
            "duration": "2x35min",
            "attachments": [
                {"name": "notes.txt", "mime_type": "text/plain", "data": "not base64!!"}
            ]
        })));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
