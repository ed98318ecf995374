use crate::domain::generation::CompletionRequest;
use async_trait::async_trait;

/// Repository for chat completion calls.
/// Abstracts the underlying language model provider.
#[async_trait]
pub trait CompletionRepository: Send + Sync {
    /// Send `request` and return the text of the first choice
    ///
    /// # Errors
    /// Returns error if the provider is unavailable or answers without content
    async fn complete(&self, request: &CompletionRequest) -> Result<String, String>;
}
