use super::speech_repository::SpeechRepository;
use async_trait::async_trait;

/// 24 kHz 16-bit mono PCM in a RIFF container
pub const AZURE_OUTPUT_FORMAT: &str = "riff-24khz-16bit-mono-pcm";
const USER_AGENT: &str = "lessontape";

/// Azure Cognitive Services text to speech over its REST endpoint
pub struct AzureSpeechRepository {
    subscription_key: String,
    endpoint: String,
    http_client: reqwest::Client,
}

impl AzureSpeechRepository {
    pub fn new(subscription_key: String, region: &str) -> Self {
        Self::with_endpoint(
            subscription_key,
            format!(
                "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
                region
            ),
        )
    }

    pub fn with_endpoint(subscription_key: String, endpoint: String) -> Self {
        Self {
            subscription_key,
            endpoint,
            http_client: reqwest::Client::new(),
        }
    }

    fn build_request(&self, ssml: &str) -> Result<reqwest::Request, reqwest::Error> {
        self.http_client
            .post(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.subscription_key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", AZURE_OUTPUT_FORMAT)
            .header("User-Agent", USER_AGENT)
            .body(ssml.to_string())
            .build()
    }
}

#[async_trait]
impl SpeechRepository for AzureSpeechRepository {
    async fn synthesize(&self, ssml: &str) -> Result<Vec<u8>, String> {
        let start_time = std::time::Instant::now();

        tracing::info!(
            endpoint = %self.endpoint,
            ssml_length = ssml.len(),
            "Calling Azure speech API"
        );

        let request = self
            .build_request(ssml)
            .map_err(|e| format!("invalid Azure speech request: {}", e))?;

        let response = self.http_client.execute(request).await.map_err(|e| {
            tracing::error!(error = %e, "Azure speech request failed");
            format!("Azure speech request failed: {}", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(
                status = %status.as_u16(),
                body = %error_text,
                "Azure speech synthesis rejected"
            );
            return Err(format!("Azure speech synthesis failed ({}): {}", status, error_text));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| format!("failed to read Azure speech audio: {}", e))?;

        tracing::info!(
            provider = "azure",
            latency_ms = start_time.elapsed().as_millis() as u64,
            audio_size_bytes = audio.len(),
            "Speech chunk synthesized"
        );

        Ok(audio.to_vec())
    }
}
