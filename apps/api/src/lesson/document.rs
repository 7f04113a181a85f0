//! The three-part lesson document returned by the text model.
//!
//! Field names here ARE the wire contract: `schema.rs` declares the same names
//! to the model, and a test keeps the two in lockstep. Fields the model may
//! omit carry `#[serde(default)]`; every other field is required and a missing
//! one fails deserialization.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub teaching_module: TeachingModule,
    pub student_worksheet: StudentWorksheet,
    pub appendix: Appendix,
}

// ────────────────────────────────────────────────────────────────────────────
// Teaching module
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeachingModule {
    pub identity: ModuleIdentity,
    pub prior_knowledge: Vec<String>,
    pub learner_profile: Vec<String>,
    #[serde(default)]
    pub facilities: Vec<String>,
    pub target_students: String,
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub meaningful_understanding: String,
    #[serde(default)]
    pub trigger_questions: Vec<String>,
    pub learning_activities: LearningActivities,
    pub assessment: AssessmentPlan,
    pub reflection: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleIdentity {
    pub school: String,
    pub subject: String,
    pub grade: String,
    /// Curriculum phase (A–F) for the grade.
    pub phase: String,
    pub time_allocation: String,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningActivities {
    pub opening: Vec<String>,
    pub core: Vec<String>,
    pub closing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentPlan {
    pub diagnostic: String,
    pub formative: String,
    pub summative: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Student worksheet
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentWorksheet {
    pub title: String,
    pub learning_instructions: Vec<String>,
    pub summary: String,
    #[serde(default)]
    pub visuals: Vec<VisualPlaceholder>,
    pub individual_task: IndividualTask,
    pub group_task: GroupTask,
    pub reflection_prompts: Vec<String>,
}

/// A worksheet slot describing an illustration to generate.
///
/// `image_url` is never produced by the text model. After enrichment it holds a
/// `data:` URI, or stays `None` (serialized as `null`) when the image failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualPlaceholder {
    pub prompt: String,
    pub caption: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualTask {
    pub instructions: String,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTask {
    pub instructions: String,
    #[serde(default)]
    pub data_table: Option<DataTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Appendix
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appendix {
    pub observation_checklist: Vec<String>,
    pub assessment_instrument: AssessmentInstrument,
    pub scoring_rubric: Vec<RubricCriterion>,
    pub enrichment_remedial: EnrichmentRemedial,
    pub glossary: Vec<GlossaryEntry>,
    pub bibliography: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentInstrument {
    pub kind: String,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricCriterion {
    pub criterion: String,
    pub levels: RubricLevels,
}

/// Four-level rubric, lowest to highest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricLevels {
    pub needs_guidance: String,
    pub adequate: String,
    pub good: String,
    pub excellent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentRemedial {
    pub enrichment: String,
    pub remedial: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
}

impl GeneratedDocument {
    /// Visuals that ended enrichment without an image.
    pub fn missing_illustrations(&self) -> usize {
        self.student_worksheet
            .visuals
            .iter()
            .filter(|v| v.image_url.is_none())
            .count()
    }
}
