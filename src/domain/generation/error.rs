use crate::domain::shared::ParseError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The completion service failed or answered with nothing
    #[error("completion service failed after {calls} call(s): {reason}")]
    Transport { calls: usize, reason: String },
    /// Every attempt produced output that did not validate
    #[error("no valid output after {attempts} attempt(s), last error: {last_error}")]
    Exhausted {
        attempts: usize,
        last_raw_output: String,
        last_error: ParseError,
    },
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Transport { .. } => AppError::ExternalService(err.to_string()),
            GenerationError::Exhausted { .. } => AppError::ContentRejected(err.to_string()),
        }
    }
}
