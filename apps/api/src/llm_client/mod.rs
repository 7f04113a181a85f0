//! LLM Client: the single point of entry for all Gemini API calls in EduGen.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini API directly.
//! All model interactions go through the `ContentModel` trait, implemented here
//! by `GeminiClient` and by scripted doubles in tests.
//!
//! Models are hardcoded (do not make configurable to prevent drift).
//! Retries are NOT performed here; callers wrap calls with `retry::retry_with_backoff`.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod retry;

use retry::RateLimitSignal;

/// Model used for schema-constrained lesson generation.
pub const TEXT_MODEL: &str = "gemini-3-pro-preview";
/// Model used for worksheet illustrations.
pub const IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION: &str = "v1beta";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    #[error("Invalid inline image data: {0}")]
    Decode(#[from] base64::DecodeError),
}

impl RateLimitSignal for LlmError {
    fn status(&self) -> Option<u16> {
        match self {
            LlmError::Api { status, .. } => Some(*status),
            LlmError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    fn code(&self) -> Option<i64> {
        match self {
            LlmError::Api { code, .. } => *code,
            _ => None,
        }
    }

    fn has_provider_message(&self) -> bool {
        !matches!(self, LlmError::Decode(_))
    }
}

/// A binary file passed through to the model next to the instruction text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPart {
    pub mime_type: String,
    pub data: Bytes,
}

/// A schema-constrained text generation call.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub instruction: String,
    pub attachments: Vec<AttachmentPart>,
    pub response_schema: Value,
}

/// An image generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub aspect_ratio: String,
}

/// Decoded image bytes returned inline by the image model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Bytes,
}

impl InlineImage {
    /// Renders the image as a `data:` URI the document views can embed directly.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            BASE64.encode(&self.data)
        )
    }
}

/// The generative-content backend used by the lesson pipeline.
///
/// `Ok(None)` means the call succeeded transport-wise but carried no usable payload.
#[async_trait]
pub trait ContentModel: Send + Sync {
    async fn generate_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<Option<String>, LlmError>;

    async fn generate_image(&self, request: &ImageRequest)
        -> Result<Option<InlineImage>, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (generateContent)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: OutgoingBlob<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutgoingBlob<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig<'a> {
    aspect_ratio: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    pub text: Option<String>,
    pub inline_data: Option<IncomingBlob>,
    #[serde(default)]
    pub thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingBlob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[ResponsePart] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// Concatenated text of the first candidate, skipping thought parts.
    /// `None` when there is no non-blank text.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// First inline image of the first candidate, decoded.
    pub fn inline_image(&self) -> Result<Option<InlineImage>, LlmError> {
        let Some(blob) = self.first_parts().iter().find_map(|p| p.inline_data.as_ref()) else {
            return Ok(None);
        };
        let data = BASE64.decode(blob.data.as_bytes())?;
        Ok(Some(InlineImage {
            mime_type: blob.mime_type.clone(),
            data: Bytes::from(data),
        }))
    }
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    code: Option<i64>,
    message: String,
    status: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The Gemini REST client shared by every request in EduGen.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: &str) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, API_VERSION, model
        )
    }

    /// Makes a single `generateContent` call, returning the parsed response.
    /// Non-2xx responses become `LlmError::Api` carrying status, code and message.
    async fn call(
        &self,
        model: &str,
        body: &GenerateContentRequest<'_>,
    ) -> Result<GenerateContentResponse, LlmError> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {} for {}: {}", status, model, body);
            return Err(api_error(status.as_u16(), &body));
        }

        let parsed: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Gemini call succeeded: model={}, prompt_tokens={:?}, candidate_tokens={:?}",
                model, usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(parsed)
    }
}

/// Maps a non-2xx body to `LlmError::Api`. Google's error envelope yields its
/// numeric code and a `STATUS: message` text; anything else is kept verbatim.
fn api_error(status: u16, body: &str) -> LlmError {
    let (code, message) = match serde_json::from_str::<GoogleError>(body) {
        Ok(e) => {
            let message = match e.error.status {
                Some(s) => format!("{s}: {}", e.error.message),
                None => e.error.message,
            };
            (e.error.code, message)
        }
        Err(_) => (None, body.to_string()),
    };
    LlmError::Api {
        status,
        code,
        message,
    }
}

#[async_trait]
impl ContentModel for GeminiClient {
    async fn generate_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<Option<String>, LlmError> {
        let body = structured_body(request);
        let response = self.call(TEXT_MODEL, &body).await?;
        Ok(response.text())
    }

    async fn generate_image(
        &self,
        request: &ImageRequest,
    ) -> Result<Option<InlineImage>, LlmError> {
        let body = image_body(request);
        let response = self.call(IMAGE_MODEL, &body).await?;
        response.inline_image()
    }
}

fn structured_body(request: &StructuredRequest) -> GenerateContentRequest<'_> {
    let mut parts = Vec::with_capacity(request.attachments.len() + 1);
    parts.push(RequestPart::Text {
        text: &request.instruction,
    });
    parts.extend(request.attachments.iter().map(|a| RequestPart::Inline {
        inline_data: OutgoingBlob {
            mime_type: &a.mime_type,
            data: BASE64.encode(&a.data),
        },
    }));

    GenerateContentRequest {
        contents: vec![RequestContent { role: "user", parts }],
        generation_config: GenerationConfig {
            response_mime_type: Some("application/json"),
            response_schema: Some(&request.response_schema),
            ..Default::default()
        },
    }
}

fn image_body(request: &ImageRequest) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![RequestContent {
            role: "user",
            parts: vec![RequestPart::Text {
                text: &request.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            response_modalities: Some(vec!["IMAGE"]),
            image_config: Some(ImageConfig {
                aspect_ratio: &request.aspect_ratio,
            }),
            ..Default::default()
        },
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
/// Schema-constrained responses are usually bare JSON, but not always.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let stripped = stripped.trim_start();
    stripped
        .strip_suffix("```")
        .map(|s| s.trim())
        .unwrap_or(stripped)
}
