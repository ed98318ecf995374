use async_trait::async_trait;
use lessontape::domain::generation::CompletionRequest;
use lessontape::domain::speech::count_voices;
use lessontape::infrastructure::audio::{encode_wav, AudioTranscoder};
use lessontape::infrastructure::repositories::{CompletionRepository, SpeechRepository};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::fixtures;

/// Completion service with separate answer queues for plan and transcript prompts.
///
/// Once a queue runs dry the stub answers with a valid default, so tests only
/// script the responses they care about.
pub struct ScriptedCompletionRepository {
    plan_responses: Mutex<VecDeque<Result<String, String>>>,
    transcript_responses: Mutex<VecDeque<Result<String, String>>>,
    default_transcript: Mutex<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletionRepository {
    pub fn new() -> Self {
        Self {
            plan_responses: Mutex::new(VecDeque::new()),
            transcript_responses: Mutex::new(VecDeque::new()),
            default_transcript: Mutex::new(fixtures::SHORT_TRANSCRIPT.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push_plan(&self, response: Result<&str, &str>) {
        self.plan_responses
            .lock()
            .unwrap()
            .push_back(response.map(str::to_string).map_err(str::to_string));
    }

    pub fn push_transcript(&self, response: Result<&str, &str>) {
        self.transcript_responses
            .lock()
            .unwrap()
            .push_back(response.map(str::to_string).map_err(str::to_string));
    }

    pub fn set_default_transcript(&self, transcript: impl Into<String>) {
        *self.default_transcript.lock().unwrap() = transcript.into();
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn plan_requests(&self) -> Vec<CompletionRequest> {
        self.requests()
            .into_iter()
            .filter(|request| is_plan_prompt(request))
            .collect()
    }

    pub fn transcript_requests(&self) -> Vec<CompletionRequest> {
        self.requests()
            .into_iter()
            .filter(|request| !is_plan_prompt(request))
            .collect()
    }
}

fn is_plan_prompt(request: &CompletionRequest) -> bool {
    request
        .messages
        .first()
        .is_some_and(|message| message.content.contains("create a learning plan"))
}

#[async_trait]
impl CompletionRepository for ScriptedCompletionRepository {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, String> {
        self.requests.lock().unwrap().push(request.clone());

        if is_plan_prompt(request) {
            let scripted = self.plan_responses.lock().unwrap().pop_front();
            return scripted.unwrap_or_else(|| Ok(fixtures::PLAN.to_string()));
        }
        let scripted = self.transcript_responses.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(self.default_transcript.lock().unwrap().clone()))
    }
}

/// Speech engine producing one 16-bit sample per byte of voice content.
///
/// The audio depends only on what is inside the `<voice>` elements, so the
/// merged output of a chunked document equals a single-request rendering.
pub struct RecordingSpeechRepository {
    documents: Mutex<Vec<String>>,
    fail_with: Option<String>,
}

impl RecordingSpeechRepository {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }

    pub fn documents(&self) -> Vec<String> {
        self.documents.lock().unwrap().clone()
    }

    pub fn voices_per_request(&self) -> Vec<usize> {
        self.documents()
            .iter()
            .map(|document| count_voices(document).unwrap())
            .collect()
    }
}

pub fn samples_for(document: &str) -> Vec<i16> {
    document
        .split("<voice")
        .skip(1)
        .filter_map(|voice| voice.split("</voice>").next())
        .flat_map(|voice| voice.bytes().map(i16::from))
        .collect()
}

pub fn wav_spec() -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate: 24_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

#[async_trait]
impl SpeechRepository for RecordingSpeechRepository {
    async fn synthesize(&self, ssml: &str) -> Result<Vec<u8>, String> {
        if let Some(reason) = &self.fail_with {
            return Err(reason.clone());
        }
        self.documents.lock().unwrap().push(ssml.to_string());
        encode_wav(wav_spec(), &samples_for(ssml))
    }
}

/// Transcoder that keeps the WAV it was given and returns a tagged copy
pub struct RecordingTranscoder {
    inputs: Mutex<Vec<Vec<u8>>>,
    cancel_after: Option<(usize, Arc<AtomicBool>)>,
}

impl RecordingTranscoder {
    pub fn new() -> Self {
        Self {
            inputs: Mutex::new(Vec::new()),
            cancel_after: None,
        }
    }

    /// Raise `flag` once `lessons` lessons have been transcoded
    pub fn cancelling_after(lessons: usize, flag: Arc<AtomicBool>) -> Self {
        Self {
            inputs: Mutex::new(Vec::new()),
            cancel_after: Some((lessons, flag)),
        }
    }

    pub fn inputs(&self) -> Vec<Vec<u8>> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioTranscoder for RecordingTranscoder {
    async fn transcode(&self, wav: Vec<u8>) -> Result<Vec<u8>, String> {
        let mut inputs = self.inputs.lock().unwrap();
        inputs.push(wav.clone());
        if let Some((lessons, flag)) = &self.cancel_after {
            if inputs.len() >= *lessons {
                flag.store(true, Ordering::SeqCst);
            }
        }

        let mut mp3 = b"ID3".to_vec();
        mp3.extend_from_slice(&(wav.len() as u32).to_be_bytes());
        Ok(mp3)
    }
}
