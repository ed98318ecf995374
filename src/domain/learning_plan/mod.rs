pub mod parser;
pub mod service;

use serde::{Deserialize, Serialize};

pub use parser::parse_plan;
pub use service::LearningPlanService;

/// Characters that cannot appear in a file name on common filesystems
const UNSAFE_FILE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// What the learner wants out of the course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningGoals {
    pub target_language: String,
    pub prior_knowledge: String,
    pub target_knowledge: String,
    pub number_of_lessons: u32,
}

impl LearningGoals {
    pub fn validate(&self) -> Result<(), String> {
        if self.target_language.trim().is_empty() {
            return Err("target language must not be empty".to_string());
        }
        if self.number_of_lessons == 0 {
            return Err("number of lessons must be at least 1".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonDescription {
    pub title: String,
    pub details: String,
}

impl LessonDescription {
    pub fn new(title: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            details: details.into(),
        }
    }

    /// Checkpoint file name stem for this lesson
    pub fn file_stem(&self) -> String {
        file_stem(&self.title)
    }
}

/// Ordered lessons; order matters for prompt continuity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningPlan {
    pub lessons: Vec<LessonDescription>,
}

impl LearningPlan {
    pub fn new(lessons: Vec<LessonDescription>) -> Self {
        Self { lessons }
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    pub fn position(&self, title: &str) -> Option<usize> {
        self.lessons.iter().position(|lesson| lesson.title == title)
    }

    /// Up to `limit` lessons immediately before `index`, oldest first
    pub fn preceding(&self, index: usize, limit: usize) -> &[LessonDescription] {
        let end = index.min(self.lessons.len());
        let start = end.saturating_sub(limit);
        &self.lessons[start..end]
    }
}

/// Map a lesson title onto a name usable as a file stem
pub fn file_stem(title: &str) -> String {
    let mapped: String = title
        .chars()
        .map(|c| {
            if c.is_control() || UNSAFE_FILE_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();
    mapped.trim_matches(|c: char| c == '.' || c.is_whitespace()).to_string()
}
