use async_trait::async_trait;

/// Repository for speech synthesis.
///
/// Implementations take a markup document the provider accepts as is (the
/// caller keeps it under the provider's element limits) and return WAV audio.
#[async_trait]
pub trait SpeechRepository: Send + Sync {
    async fn synthesize(&self, ssml: &str) -> Result<Vec<u8>, String>;
}
