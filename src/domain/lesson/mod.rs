pub mod error;
pub mod pipeline;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use error::{PipelineError, Stage};
pub use pipeline::LessonPipeline;

/// A lesson that failed while the run carried on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonFailure {
    pub title: String,
    pub reason: String,
}

/// What happened to each lesson of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub completed: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<LessonFailure>,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            completed: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            cancelled: false,
        }
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    /// True when every lesson of the plan has audio
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }
}
