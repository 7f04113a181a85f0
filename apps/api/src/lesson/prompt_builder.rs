//! Prompt Builder: turns a `GenerationRequest` into the instruction text and
//! binary parts of one generation call. Pure and deterministic.

use crate::lesson::models::GenerationRequest;
use crate::lesson::prompts::{
    CONTENT_REQUIREMENTS, LESSON_TASK, NOT_SPECIFIED, REFERENCE_DIRECTIVE, RESPONSE_FORMAT,
    TERMINOLOGY_RULES,
};
use crate::llm_client::AttachmentPart;

/// Instruction text plus attachments, in the order they are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload {
    pub instruction: String,
    pub attachments: Vec<AttachmentPart>,
}

pub fn build_prompt(request: &GenerationRequest) -> PromptPayload {
    let mut sections = vec![
        LESSON_TASK.to_string(),
        terminology_section(),
        pedagogy_section(request),
        identity_section(request),
        CONTENT_REQUIREMENTS.to_string(),
    ];

    if let Some(instructions) = request.instructions() {
        sections.push(format!("TEACHER INSTRUCTIONS:\n{instructions}"));
    }

    if !request.attachments.is_empty() {
        let file_list = request
            .attachments
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        sections.push(REFERENCE_DIRECTIVE.replace("{file_list}", &file_list));
    }

    sections.push(RESPONSE_FORMAT.to_string());

    // Attachments pass through untouched; `Bytes` clones share the buffer.
    let attachments = request
        .attachments
        .iter()
        .map(|a| AttachmentPart {
            mime_type: a.mime_type.clone(),
            data: a.data.clone(),
        })
        .collect();

    PromptPayload {
        instruction: sections.join("\n\n"),
        attachments,
    }
}

fn terminology_section() -> String {
    let rules = TERMINOLOGY_RULES
        .iter()
        .enumerate()
        .map(|(i, rule)| {
            let disallowed = rule
                .disallowed
                .iter()
                .map(|t| format!("\"{t}\""))
                .collect::<Vec<_>>()
                .join(" or ");
            format!(
                "{}. Always use \"{}\"; never use {} anywhere in any document.",
                i + 1,
                rule.preferred,
                disallowed
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("TERMINOLOGY RULES (apply throughout):\n{rules}")
}

fn pedagogy_section(request: &GenerationRequest) -> String {
    let pillars = request.distinct_pillars();
    let pillars = if pillars.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        pillars.join(", ")
    };
    format!(
        "PEDAGOGICAL CONFIGURATION:\n\
         - Deep Learning pillars: {}\n\
         - Instructional model: {}\n\
         - Teaching method: {}",
        pillars,
        or_not_specified(&request.instructional_model),
        or_not_specified(&request.teaching_method),
    )
}

fn identity_section(request: &GenerationRequest) -> String {
    format!(
        "LESSON IDENTITY:\n\
         - School: {}\n\
         - Subject: {}\n\
         - Topic: {}\n\
         - Grade: {}\n\
         - Time allocation: {}",
        or_not_specified(&request.school),
        request.subject.trim(),
        request.topic.trim(),
        request.grade.trim(),
        request.duration.trim(),
    )
}

fn or_not_specified(value: &str) -> &str {
    let value = value.trim();
    if value.is_empty() {
        NOT_SPECIFIED
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::models::Attachment;
    use bytes::Bytes;

    fn civics_request() -> GenerationRequest {
        GenerationRequest {
            school: "SD Negeri 1 Harapan".to_string(),
            subject: "Civics".to_string(),
            topic: "Norms".to_string(),
            grade: "Grade 6".to_string(),
            duration: "2x35min".to_string(),
            pillars: vec!["Mindful Learning".to_string()],
            instructional_model: "Problem-Based Learning".to_string(),
            teaching_method: "Group Discussion".to_string(),
            special_instructions: None,
            attachments: vec![],
        }
    }

    #[test]
    fn test_build_prompt_is_deterministic() {
        let request = civics_request();
        assert_eq!(build_prompt(&request), build_prompt(&request.clone()));
    }

    #[test]
    fn test_prompt_embeds_identity_and_pedagogy() {
        let payload = build_prompt(&civics_request());
        let text = &payload.instruction;
        assert!(text.contains("- Subject: Civics"));
        assert!(text.contains("- Topic: Norms"));
        assert!(text.contains("- Grade: Grade 6"));
        assert!(text.contains("- Time allocation: 2x35min"));
        assert!(text.contains("- School: SD Negeri 1 Harapan"));
        assert!(text.contains("- Deep Learning pillars: Mindful Learning"));
        assert!(text.contains("- Instructional model: Problem-Based Learning"));
        assert!(text.contains("- Teaching method: Group Discussion"));
        assert!(payload.attachments.is_empty());
    }

    #[test]
    fn test_prompt_carries_terminology_rules() {
        let text = build_prompt(&civics_request()).instruction;
        assert!(text.contains(
            "Always use \"Murid\"; never use \"Siswa\" or \"Peserta Didik\""
        ));
        assert!(text.contains("Always use \"Lembar Kerja\"; never use \"LKPD\""));
    }

    #[test]
    fn test_optional_sections_absent_by_default() {
        let text = build_prompt(&civics_request()).instruction;
        assert!(!text.contains("TEACHER INSTRUCTIONS"));
        assert!(!text.contains("REFERENCE MATERIAL"));
    }

    #[test]
    fn test_instructions_and_attachments_are_included() {
        let mut request = civics_request();
        request.special_instructions = Some("Use examples from Bali".to_string());
        request.attachments = vec![
            Attachment {
                name: "silabus.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
                data: Bytes::from_static(b"%PDF-1.7"),
            },
            Attachment {
                name: "page12.png".to_string(),
                mime_type: "image/png".to_string(),
                data: Bytes::from_static(&[0x89, b'P']),
            },
        ];

        let payload = build_prompt(&request);
        assert!(payload
            .instruction
            .contains("TEACHER INSTRUCTIONS:\nUse examples from Bali"));
        assert!(payload.instruction.contains("(silabus.pdf, page12.png)"));
        assert_eq!(payload.attachments.len(), 2);
        assert_eq!(payload.attachments[0].mime_type, "application/pdf");
        assert_eq!(payload.attachments[0].data, Bytes::from_static(b"%PDF-1.7"));
        assert_eq!(payload.attachments[1].mime_type, "image/png");
    }

    #[test]
    fn test_blank_pedagogy_fields_are_marked_unspecified() {
        let mut request = civics_request();
        request.pillars.clear();
        request.school = "  ".to_string();
        let text = build_prompt(&request).instruction;
        assert!(text.contains("- Deep Learning pillars: (not specified)"));
        assert!(text.contains("- School: (not specified)"));
    }

    #[test]
    fn test_instruction_ends_with_response_format() {
        let text = build_prompt(&civics_request()).instruction;
        assert!(text.ends_with(RESPONSE_FORMAT));
        assert!(text.starts_with(LESSON_TASK));
    }
}
