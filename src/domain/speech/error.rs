use crate::error::AppError;

/// The markup handed to the chunker is not something the serializer produces
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkingError {
    #[error("markup has no <speak> root")]
    MissingRoot,
    #[error("markup has no <voice> elements")]
    NoVoices,
    #[error("<voice> at byte {offset} is never closed")]
    UnclosedVoice { offset: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechServiceError {
    #[error("chunking error: {0}")]
    Chunking(#[from] ChunkingError),
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("merge error: {0}")]
    Merge(String),
}

impl From<SpeechServiceError> for AppError {
    fn from(err: SpeechServiceError) -> Self {
        match err {
            SpeechServiceError::Dependency(msg) => AppError::ExternalService(msg),
            SpeechServiceError::Chunking(e) => AppError::Internal(e.to_string()),
            SpeechServiceError::Merge(msg) => AppError::Internal(msg),
        }
    }
}
