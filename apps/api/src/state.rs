use crate::config::Config;
use crate::lesson::pipeline::LessonPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Stateless; every request runs against its own document.
    pub lessons: LessonPipeline,
    pub config: Config,
}
