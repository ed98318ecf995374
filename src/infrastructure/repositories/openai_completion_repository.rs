use super::completion_repository::CompletionRepository;
use crate::domain::generation::{ChatMessage, ChatRole, CompletionRequest};
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI chat completion implementation of the completion repository
pub struct OpenAiCompletionRepository {
    client: Arc<Client<OpenAIConfig>>,
}

impl OpenAiCompletionRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>) -> Self {
        Self { client }
    }

    fn to_openai_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage, OpenAIError> {
        let content = message.content.as_str();
        Ok(match message.role {
            ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(content)
                .build()?
                .into(),
            ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                .content(content)
                .build()?
                .into(),
            ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(content)
                .build()?
                .into(),
        })
    }

    fn to_openai_request(request: &CompletionRequest) -> Result<CreateChatCompletionRequest, OpenAIError> {
        let messages = request
            .messages
            .iter()
            .map(Self::to_openai_message)
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(request.model.as_str()).messages(messages);
        if let Some(temperature) = request.temperature {
            builder.temperature(temperature);
        }
        if let Some(presence_penalty) = request.presence_penalty {
            builder.presence_penalty(presence_penalty);
        }
        if let Some(frequency_penalty) = request.frequency_penalty {
            builder.frequency_penalty(frequency_penalty);
        }
        builder.build()
    }
}

#[async_trait]
impl CompletionRepository for OpenAiCompletionRepository {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, String> {
        let start_time = std::time::Instant::now();

        tracing::info!(
            model = %request.model,
            messages = request.messages.len(),
            prompt_length = request.messages.iter().map(|m| m.content.len()).sum::<usize>(),
            "Calling OpenAI chat completion API"
        );

        let openai_request = Self::to_openai_request(request)
            .map_err(|e| format!("invalid OpenAI request: {}", e))?;

        let response = self
            .client
            .chat()
            .create(openai_request)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    model = %request.model,
                    "OpenAI chat completion call failed"
                );
                format!("OpenAI chat completion error: {}", e)
            })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| "OpenAI returned no content".to_string())?;

        tracing::info!(
            provider = "openai",
            model = %request.model,
            latency_ms = start_time.elapsed().as_millis() as u64,
            response_length = content.len(),
            "Chat completion received"
        );

        Ok(content)
    }
}
