use crate::domain::generation::GenerationError;
use crate::domain::speech::SpeechServiceError;
use crate::error::AppError;
use std::fmt;

/// Which oracle call a generation failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Plan,
    Transcript,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Plan => write!(f, "learning plan"),
            Stage::Transcript => write!(f, "transcript"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no learning goals given and none stored in the output directory")]
    MissingGoals,
    #[error("invalid learning goals: {0}")]
    InvalidGoals(String),
    #[error("{stage} generation failed{}: {source}", for_lesson(.lesson))]
    Generation {
        stage: Stage,
        lesson: Option<String>,
        source: GenerationError,
    },
    #[error("speech synthesis failed for lesson {lesson:?}: {source}")]
    Speech {
        lesson: String,
        source: SpeechServiceError,
    },
    #[error("transcoding failed for lesson {lesson:?}: {reason}")]
    Transcode { lesson: String, reason: String },
    #[error("checkpoint error: {0}")]
    Checkpoint(String),
}

fn for_lesson(lesson: &Option<String>) -> String {
    lesson
        .as_ref()
        .map(|title| format!(" for lesson {:?}", title))
        .unwrap_or_default()
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let message = err.to_string();
        match err {
            PipelineError::MissingGoals | PipelineError::InvalidGoals(_) => {
                AppError::InvalidInput(message)
            }
            PipelineError::Generation { source, .. } => match source {
                GenerationError::Transport { .. } => AppError::ExternalService(message),
                GenerationError::Exhausted { .. } => AppError::ContentRejected(message),
            },
            PipelineError::Speech { source, .. } => match source {
                SpeechServiceError::Dependency(_) => AppError::ExternalService(message),
                _ => AppError::Internal(message),
            },
            PipelineError::Transcode { .. } => AppError::ExternalService(message),
            PipelineError::Checkpoint(_) => AppError::Storage(message),
        }
    }
}
