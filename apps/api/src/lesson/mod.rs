// Lesson generation: prompt building, schema-constrained generation and
// illustration enrichment. All model calls go through llm_client.

pub mod document;
pub mod enricher;
pub mod generator;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod prompt_builder;
pub mod prompts;
pub mod schema;

#[cfg(test)]
pub mod testing;
