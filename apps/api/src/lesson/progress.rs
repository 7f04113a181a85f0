//! Progress Reporter: forwards stage labels to an optional caller callback.

/// The stage transitions a caller can observe, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PreparingPrompt,
    Generating,
    Illustrating,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::PreparingPrompt => "Preparing lesson ideas...",
            Stage::Generating => "Analyzing curriculum and designing the learning strategy...",
            Stage::Illustrating => "Illustrating worksheet visuals...",
        }
    }
}

pub type ProgressCallback<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// Synchronous, unbuffered sink. Without a callback every report is a no-op.
#[derive(Clone, Copy, Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[cfg(test)]
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn report(&self, stage: Stage) {
        if let Some(callback) = self.callback {
            callback(stage.label());
        }
    }
}
