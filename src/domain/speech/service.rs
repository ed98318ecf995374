use super::chunker::split_markup;
use super::error::SpeechServiceError;
use crate::infrastructure::audio::merge_wav;
use crate::infrastructure::repositories::SpeechRepository;
use std::sync::Arc;

/// Engine limit on `<voice>` elements per request
pub const DEFAULT_MAX_VOICES_PER_REQUEST: usize = 50;

pub struct SpeechService {
    speech_repo: Arc<dyn SpeechRepository>,
    max_voices_per_request: usize,
}

impl SpeechService {
    pub fn new(speech_repo: Arc<dyn SpeechRepository>, max_voices_per_request: usize) -> Self {
        Self {
            speech_repo,
            max_voices_per_request,
        }
    }

    /// Synthesize a markup document into one WAV buffer.
    ///
    /// Documents over the voice limit are split, synthesized chunk by chunk in
    /// order, and the decoded samples stitched back into a single file.
    pub async fn synthesize(&self, markup: &str) -> Result<Vec<u8>, SpeechServiceError> {
        let start_time = std::time::Instant::now();

        // 1. Split into engine-sized documents
        let chunks = split_markup(markup, self.max_voices_per_request)?;
        tracing::info!(
            chunk_count = chunks.len(),
            markup_length = markup.len(),
            max_voices = self.max_voices_per_request,
            "Markup split into chunks"
        );

        // 2. Synthesize sequentially, order is the audio order
        let mut buffers = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let audio = self
                .speech_repo
                .synthesize(chunk)
                .await
                .map_err(SpeechServiceError::Dependency)?;
            tracing::debug!(
                chunk_index = index,
                chunk_length = chunk.len(),
                audio_size = audio.len(),
                "Chunk synthesized"
            );
            buffers.push(audio);
        }

        // 3. Merge
        let audio = if buffers.len() == 1 {
            buffers.remove(0)
        } else {
            merge_wav(&buffers).map_err(SpeechServiceError::Merge)?
        };

        tracing::info!(
            chunk_count = chunks.len(),
            audio_size_bytes = audio.len(),
            latency_ms = start_time.elapsed().as_millis() as u64,
            "Speech synthesis completed"
        );
        Ok(audio)
    }
}
