use bytes::Bytes;

/// A reference file supplied by the teacher (syllabus, textbook page, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub data: Bytes,
}

/// Everything the teacher submitted for one generation. Built fresh per submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub school: String,
    pub subject: String,
    pub topic: String,
    pub grade: String,
    pub duration: String,
    /// Deep Learning pillars, e.g. "Mindful Learning". Treated as a set.
    pub pillars: Vec<String>,
    pub instructional_model: String,
    pub teaching_method: String,
    pub special_instructions: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl GenerationRequest {
    /// Pillars trimmed, blanks dropped, duplicates removed keeping first occurrence.
    pub fn distinct_pillars(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.pillars.len());
        for pillar in self.pillars.iter().map(|p| p.trim()) {
            if !pillar.is_empty() && !seen.contains(&pillar) {
                seen.push(pillar);
            }
        }
        seen
    }

    /// Special instructions, if any non-blank text was given.
    pub fn instructions(&self) -> Option<&str> {
        self.special_instructions
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
