use super::dto::CompletionRequest;
use super::error::GenerationError;
use crate::domain::prompts;
use crate::domain::shared::ParseError;
use crate::infrastructure::repositories::CompletionRepository;
use std::sync::Arc;
use std::time::Duration;

/// What to do when the completion service itself fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportRetry {
    /// Give up on the first failure
    Abort,
    /// Re-send the same attempt, doubling the delay each time
    Backoff {
        max_retries: u32,
        initial_delay: Duration,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub transport: TransportRetry,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            transport: TransportRetry::Abort,
        }
    }
}

/// Drives the generate, validate, repair cycle against the completion service
pub struct Generator {
    completion_repo: Arc<dyn CompletionRepository>,
    policy: RetryPolicy,
}

impl Generator {
    pub fn new(completion_repo: Arc<dyn CompletionRepository>, policy: RetryPolicy) -> Self {
        Self {
            completion_repo,
            policy,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Ask for output until `validate` accepts it or the attempt budget runs out.
    ///
    /// Repair attempts carry the rejected output and the validation error so
    /// the model corrects its answer instead of starting over.
    pub async fn generate_validated<T, F>(
        &self,
        request: &CompletionRequest,
        validate: F,
    ) -> Result<T, GenerationError>
    where
        F: Fn(&str) -> Result<T, ParseError>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut previous: Option<(String, ParseError)> = None;

        for attempt in 1..=max_attempts {
            let attempt_request = match &previous {
                Some((raw, error)) => {
                    request.with_repair(raw, prompts::repair_instruction(error))
                }
                None => request.clone(),
            };

            let raw = self.complete_with_retry(&attempt_request).await?;

            match validate(&raw) {
                Ok(value) => {
                    tracing::debug!(attempt, output_length = raw.len(), "Generated output validated");
                    return Ok(value);
                }
                Err(error) => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        reason = %error,
                        raw_output = %raw,
                        "Generated output failed validation"
                    );
                    previous = Some((raw, error));
                }
            }
        }

        let (last_raw_output, last_error) = previous.ok_or_else(|| GenerationError::Transport {
            calls: 0,
            reason: "no attempt was made".to_string(),
        })?;
        Err(GenerationError::Exhausted {
            attempts: max_attempts,
            last_raw_output,
            last_error,
        })
    }

    /// One logical attempt: transport failures are retried here and never
    /// count against the validation budget
    async fn complete_with_retry(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        let (max_retries, mut delay) = match self.policy.transport {
            TransportRetry::Abort => (0, Duration::ZERO),
            TransportRetry::Backoff {
                max_retries,
                initial_delay,
            } => (max_retries, initial_delay),
        };

        let mut calls = 0;
        loop {
            calls += 1;
            let reason = match self.completion_repo.complete(request).await {
                Ok(text) if !text.trim().is_empty() => return Ok(text),
                Ok(_) => "empty response".to_string(),
                Err(e) => e,
            };

            if calls > max_retries as usize {
                tracing::error!(calls, reason = %reason, "Completion service failed");
                return Err(GenerationError::Transport { calls, reason });
            }

            tracing::warn!(
                calls,
                retry_in_ms = delay.as_millis() as u64,
                reason = %reason,
                "Completion service failed, retrying"
            );
            tokio::time::sleep(delay).await;
            delay = delay.saturating_mul(2);
        }
    }
}
