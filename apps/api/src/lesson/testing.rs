//! Test doubles shared by the lesson module tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};

use crate::llm_client::{
    ContentModel, ImageRequest, InlineImage, LlmError, StructuredRequest,
};

/// A complete, schema-valid lesson document with three unenriched visuals.
pub fn sample_document_json(subject: &str) -> Value {
    json!({
        "teaching_module": {
            "identity": {
                "school": "SD Negeri 1 Harapan",
                "subject": subject,
                "grade": "Grade 6",
                "phase": "C",
                "time_allocation": "2x35min",
                "author": "Ibu Sari"
            },
            "prior_knowledge": ["Murid mengenal aturan di rumah"],
            "learner_profile": ["Bernalar kritis", "Gotong royong"],
            "facilities": ["Proyektor", "Kertas plano"],
            "target_students": "Murid reguler",
            "learning_objectives": ["Murid dapat membedakan jenis norma"],
            "meaningful_understanding": "Norma menjaga ketertiban bersama",
            "trigger_questions": ["Mengapa kita perlu aturan?"],
            "learning_activities": {
                "opening": ["Salam dan doa"],
                "core": ["Diskusi kelompok tentang norma"],
                "closing": ["Refleksi bersama"]
            },
            "assessment": {
                "diagnostic": "Tanya jawab awal",
                "formative": "Observasi diskusi",
                "summative": "Tes tertulis"
            },
            "reflection": "Apa yang sudah berjalan baik?"
        },
        "student_worksheet": {
            "title": "Lembar Kerja: Norma di Sekitarku",
            "learning_instructions": ["Baca materi", "Kerjakan tugas"],
            "summary": "Norma adalah aturan yang berlaku di masyarakat.",
            "visuals": [
                {"prompt": "children queueing politely", "caption": "Antre dengan tertib"},
                {"prompt": "family eating together", "caption": "Norma kesopanan di rumah"},
                {"prompt": "students cleaning the classroom", "caption": "Piket kelas"}
            ],
            "individual_task": {
                "instructions": "Jawablah pertanyaan berikut.",
                "questions": ["Sebutkan 3 contoh norma."]
            },
            "group_task": {
                "instructions": "Lengkapi tabel bersama kelompokmu.",
                "data_table": {
                    "headers": ["Tempat", "Norma", "Sanksi"],
                    "rows": [["Rumah", "", ""], ["Sekolah", "", ""]]
                }
            },
            "reflection_prompts": ["Apa yang kamu pelajari hari ini?"]
        },
        "appendix": {
            "observation_checklist": ["Murid aktif berdiskusi"],
            "assessment_instrument": {
                "kind": "Pilihan ganda",
                "questions": ["Norma yang berasal dari Tuhan disebut..."]
            },
            "scoring_rubric": [{
                "criterion": "Pemahaman konsep",
                "levels": {
                    "needs_guidance": "Belum memahami",
                    "adequate": "Memahami sebagian",
                    "good": "Memahami",
                    "excellent": "Memahami dan memberi contoh"
                }
            }],
            "enrichment_remedial": {
                "enrichment": "Membuat poster norma",
                "remedial": "Bimbingan ulang konsep norma"
            },
            "glossary": [{"term": "Norma", "definition": "Aturan yang berlaku"}],
            "bibliography": ["Kemendikbudristek. (2026). Buku Pendidikan Pancasila Kelas VI."]
        }
    })
}

pub fn png() -> InlineImage {
    InlineImage {
        mime_type: "image/png".to_string(),
        data: Bytes::from_static(&[0x89, b'P', b'N', b'G']),
    }
}

pub fn rate_limited() -> LlmError {
    LlmError::Api {
        status: 429,
        code: Some(429),
        message: "RESOURCE_EXHAUSTED: Resource has been exhausted".to_string(),
    }
}

pub fn server_error() -> LlmError {
    LlmError::Api {
        status: 500,
        code: Some(500),
        message: "INTERNAL: backend failure".to_string(),
    }
}

/// A `ContentModel` that replays scripted replies in order and records every call.
///
/// When the image script runs dry, further image calls succeed with `png()`.
/// When the text script runs dry, further text calls return `Ok(None)`.
#[derive(Default)]
pub struct ScriptedModel {
    structured: Mutex<VecDeque<Result<Option<String>, LlmError>>>,
    images: Mutex<VecDeque<Result<Option<InlineImage>, LlmError>>>,
    pub structured_calls: Mutex<Vec<StructuredRequest>>,
    pub image_calls: Mutex<Vec<ImageRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, reply: Result<Option<String>, LlmError>) -> Self {
        self.structured.lock().unwrap().push_back(reply);
        self
    }

    pub fn with_document(self, document: &Value) -> Self {
        self.with_text(Ok(Some(document.to_string())))
    }

    pub fn with_image(self, reply: Result<Option<InlineImage>, LlmError>) -> Self {
        self.images.lock().unwrap().push_back(reply);
        self
    }

    pub fn structured_call_count(&self) -> usize {
        self.structured_calls.lock().unwrap().len()
    }

    pub fn image_call_count(&self) -> usize {
        self.image_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentModel for ScriptedModel {
    async fn generate_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<Option<String>, LlmError> {
        self.structured_calls.lock().unwrap().push(request.clone());
        self.structured
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(None))
    }

    async fn generate_image(
        &self,
        request: &ImageRequest,
    ) -> Result<Option<InlineImage>, LlmError> {
        self.image_calls.lock().unwrap().push(request.clone());
        self.images
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Some(png())))
    }
}
