// All model prompt constants for the lesson module.

/// A controlled-vocabulary rule: `preferred` replaces every `disallowed` term.
pub struct TermRule {
    pub preferred: &'static str,
    pub disallowed: &'static [&'static str],
}

pub const TERMINOLOGY_RULES: &[TermRule] = &[
    TermRule {
        preferred: "Murid",
        disallowed: &["Siswa", "Peserta Didik"],
    },
    TermRule {
        preferred: "Lembar Kerja",
        disallowed: &["LKPD", "Lembar Kerja Peserta Didik"],
    },
];

/// Opening line of every lesson generation prompt.
pub const LESSON_TASK: &str = "Create a complete Teaching Module (Modul Ajar), Student Worksheet \
    (Lembar Kerja) and Appendix (Lampiran) aligned with the latest 2026 revision of Kurikulum Merdeka, \
    following Deep Learning principles. Write every document in Bahasa Indonesia.";

/// Fixed content requirements recovered from the curriculum template.
pub const CONTENT_REQUIREMENTS: &str = r#"CONTENT REQUIREMENTS:
1. The Appendix must include: a teacher observation checklist, an assessment instrument with questions, a detailed scoring rubric with exactly 4 levels per criterion (needs_guidance, adequate, good, excellent), enrichment and remedial guidance, a glossary, and a bibliography.
2. The Student Worksheet must include exactly 2 entries in `visuals`, each an image description an AI illustrator can draw, with a short caption.
3. Copy the subject, grade and time allocation into `teaching_module.identity` exactly as given above.
4. Align learning activities with the instructional model and teaching method above, and reflect every listed pillar."#;

/// Appended when reference files are attached. Replace `{file_list}`.
pub const REFERENCE_DIRECTIVE: &str = "REFERENCE MATERIAL: The attached file(s) ({file_list}) are \
    the teacher's own reference material. Prioritize their content, scope and terminology over \
    general knowledge wherever they apply.";

pub const RESPONSE_FORMAT: &str = "Respond with a single JSON object that follows the provided response schema.";

/// Illustration prompt for a worksheet visual. Replace `{prompt}`.
pub const ILLUSTRATION_PROMPT_TEMPLATE: &str = "A clean, professional, minimalist educational \
    illustration suitable for print, depicting: {prompt}";

pub const ILLUSTRATION_ASPECT_RATIO: &str = "16:9";

pub const NOT_SPECIFIED: &str = "(not specified)";
