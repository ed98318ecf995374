use crate::domain::generation::{RetryPolicy, TransportRetry};
use crate::domain::speech::DEFAULT_MAX_VOICES_PER_REQUEST;
use crate::domain::transcript::{
    ParseOptions, TranscriptDialect, DEFAULT_BASE_LOCALE, DEFAULT_FOREIGN_RATE, DEFAULT_PAUSE,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_VOICE: &str = "en-US-RyanMultilingualNeural";
pub const DEFAULT_MODEL: &str = "gpt-4";

#[derive(Debug, Clone)]
pub struct Config {
    // OpenAI
    pub openai_api_key: String,
    pub openai_model: String,
    // Azure speech
    pub azure_speech_key: String,
    pub azure_speech_region: String,
    pub speech_voice: String,
    pub max_voices_per_request: usize,
    // Transcript conventions
    pub base_locale: String,
    pub foreign_rate: String,
    pub pause_duration: String,
    pub transcript_dialect: TranscriptDialect,
    // Generation retries
    pub generation_max_attempts: usize,
    pub transport_retries: u32,
    pub transport_retry_delay_ms: u64,
    // Run
    pub output_dir: PathBuf,
    pub ffmpeg_path: String,
    pub continue_on_error: bool,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from any variable source; `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<String, String> {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| format!("environment variable {} is required", name))
        };
        let or_default = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let config = Config {
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_model: or_default("OPENAI_MODEL", DEFAULT_MODEL),
            azure_speech_key: required("AZURE_SPEECH_KEY")?,
            azure_speech_region: required("AZURE_SPEECH_REGION")?,
            speech_voice: or_default("SPEECH_VOICE", DEFAULT_VOICE),
            max_voices_per_request: or_default(
                "MAX_VOICES_PER_REQUEST",
                &DEFAULT_MAX_VOICES_PER_REQUEST.to_string(),
            )
            .parse()?,
            base_locale: or_default("BASE_LOCALE", DEFAULT_BASE_LOCALE),
            foreign_rate: or_default("FOREIGN_RATE", DEFAULT_FOREIGN_RATE),
            pause_duration: or_default("PAUSE_DURATION", DEFAULT_PAUSE),
            transcript_dialect: or_default("TRANSCRIPT_DIALECT", "inline").parse()?,
            generation_max_attempts: or_default("GENERATION_MAX_ATTEMPTS", "3").parse()?,
            transport_retries: or_default("TRANSPORT_RETRIES", "0").parse()?,
            transport_retry_delay_ms: or_default("TRANSPORT_RETRY_DELAY_MS", "1000").parse()?,
            output_dir: PathBuf::from(or_default("OUTPUT_DIR", "output")),
            ffmpeg_path: or_default("FFMPEG_PATH", "ffmpeg"),
            continue_on_error: or_default("CONTINUE_ON_ERROR", "false").to_lowercase() == "true",
            log_format: match or_default("LOG_FORMAT", "pretty").to_lowercase().as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        if config.max_voices_per_request == 0 {
            return Err("MAX_VOICES_PER_REQUEST must be at least 1".into());
        }
        if config.generation_max_attempts == 0 {
            return Err("GENERATION_MAX_ATTEMPTS must be at least 1".into());
        }

        Ok(config)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let transport = if self.transport_retries == 0 {
            TransportRetry::Abort
        } else {
            TransportRetry::Backoff {
                max_retries: self.transport_retries,
                initial_delay: Duration::from_millis(self.transport_retry_delay_ms),
            }
        };
        RetryPolicy {
            max_attempts: self.generation_max_attempts,
            transport,
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            base_locale: self.base_locale.clone(),
            pause: self.pause_duration.clone(),
            foreign_rate: self.foreign_rate.clone(),
        }
    }
}
