pub mod chunker;
pub mod error;
pub mod service;

pub use chunker::{count_voices, split_markup};
pub use error::{ChunkingError, SpeechServiceError};
pub use service::{SpeechService, DEFAULT_MAX_VOICES_PER_REQUEST};
