//! Response schema sent to the text model with every generation call.
//!
//! This is a versioned data contract: bump `SCHEMA_VERSION` whenever a field is
//! added, removed or changes required-ness, and keep `document.rs` in step.
//! Types use the upper-case OpenAPI subset the Gemini API accepts.

use serde_json::{json, Value};

pub const SCHEMA_VERSION: u32 = 1;

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn string_list() -> Value {
    json!({ "type": "ARRAY", "items": string() })
}

fn list_of(items: Value) -> Value {
    json!({ "type": "ARRAY", "items": items })
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({ "type": "OBJECT", "properties": properties, "required": required })
}

fn teaching_module() -> Value {
    object(
        json!({
            "identity": object(
                json!({
                    "school": string(),
                    "subject": string(),
                    "grade": string(),
                    "phase": string(),
                    "time_allocation": string(),
                    "author": string(),
                }),
                &["school", "subject", "grade", "phase", "time_allocation", "author"],
            ),
            "prior_knowledge": string_list(),
            "learner_profile": string_list(),
            "facilities": string_list(),
            "target_students": string(),
            "learning_objectives": string_list(),
            "meaningful_understanding": string(),
            "trigger_questions": string_list(),
            "learning_activities": object(
                json!({
                    "opening": string_list(),
                    "core": string_list(),
                    "closing": string_list(),
                }),
                &["opening", "core", "closing"],
            ),
            "assessment": object(
                json!({
                    "diagnostic": string(),
                    "formative": string(),
                    "summative": string(),
                }),
                &["diagnostic", "formative", "summative"],
            ),
            "reflection": string(),
        }),
        &[
            "identity",
            "prior_knowledge",
            "learner_profile",
            "target_students",
            "learning_objectives",
            "learning_activities",
            "assessment",
            "reflection",
        ],
    )
}

fn student_worksheet() -> Value {
    object(
        json!({
            "title": string(),
            "learning_instructions": string_list(),
            "summary": string(),
            "visuals": list_of(object(
                json!({ "prompt": string(), "caption": string() }),
                &["prompt", "caption"],
            )),
            "individual_task": object(
                json!({ "instructions": string(), "questions": string_list() }),
                &["instructions", "questions"],
            ),
            "group_task": object(
                json!({
                    "instructions": string(),
                    "data_table": object(
                        json!({
                            "headers": string_list(),
                            "rows": list_of(string_list()),
                        }),
                        &["headers", "rows"],
                    ),
                }),
                &["instructions"],
            ),
            "reflection_prompts": string_list(),
        }),
        &[
            "title",
            "learning_instructions",
            "summary",
            "individual_task",
            "group_task",
            "reflection_prompts",
        ],
    )
}

fn appendix() -> Value {
    object(
        json!({
            "observation_checklist": string_list(),
            "assessment_instrument": object(
                json!({ "kind": string(), "questions": string_list() }),
                &["kind", "questions"],
            ),
            "scoring_rubric": list_of(object(
                json!({
                    "criterion": string(),
                    "levels": object(
                        json!({
                            "needs_guidance": string(),
                            "adequate": string(),
                            "good": string(),
                            "excellent": string(),
                        }),
                        &["needs_guidance", "adequate", "good", "excellent"],
                    ),
                }),
                &["criterion", "levels"],
            )),
            "enrichment_remedial": object(
                json!({ "enrichment": string(), "remedial": string() }),
                &["enrichment", "remedial"],
            ),
            "glossary": list_of(object(
                json!({ "term": string(), "definition": string() }),
                &["term", "definition"],
            )),
            "bibliography": string_list(),
        }),
        &[
            "observation_checklist",
            "assessment_instrument",
            "scoring_rubric",
            "enrichment_remedial",
            "glossary",
            "bibliography",
        ],
    )
}

/// The full three-part document schema.
pub fn lesson_schema() -> Value {
    object(
        json!({
            "teaching_module": teaching_module(),
            "student_worksheet": student_worksheet(),
            "appendix": appendix(),
        }),
        &["teaching_module", "student_worksheet", "appendix"],
    )
}
