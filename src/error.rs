use crate::domain::shared::ParseError;

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Generated content rejected: {0}")]
    ContentRejected(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 78,
            Self::InvalidInput(_) | Self::Parse(_) => 65,
            Self::ExternalService(_) => 69,
            Self::ContentRejected(_) => 70,
            Self::Storage(_) | Self::Io(_) => 74,
            Self::Internal(_) => 1,
        }
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
