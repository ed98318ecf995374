pub mod azure_speech_repository;
pub mod checkpoint_repository;
pub mod completion_repository;
pub mod openai_completion_repository;
pub mod speech_repository;

pub use azure_speech_repository::AzureSpeechRepository;
pub use checkpoint_repository::{CheckpointRepository, FileCheckpointRepository};
pub use completion_repository::CompletionRepository;
pub use openai_completion_repository::OpenAiCompletionRepository;
pub use speech_repository::SpeechRepository;
