use anyhow::{Context, Result};
use lessontape::domain::generation::{Generator, RetryPolicy};
use lessontape::domain::learning_plan::{LearningPlan, LearningPlanService};
use lessontape::domain::lesson::LessonPipeline;
use lessontape::domain::speech::SpeechService;
use lessontape::domain::transcript::{ParseOptions, TranscriptDialect, TranscriptService};
use lessontape::infrastructure::audio::AudioTranscoder;
use lessontape::infrastructure::repositories::{FileCheckpointRepository, SpeechRepository};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use test_context::AsyncTestContext;

pub mod fixtures;
pub mod stubs;

use stubs::{RecordingSpeechRepository, RecordingTranscoder, ScriptedCompletionRepository};

pub const VOICE: &str = "en-US-RyanMultilingualNeural";

/// One scratch output directory plus the stubbed services around it
pub struct PipelineContext {
    pub completion: Arc<ScriptedCompletionRepository>,
    pub speech: Arc<RecordingSpeechRepository>,
    pub transcoder: Arc<RecordingTranscoder>,
    pub policy: RetryPolicy,
    pub dialect: TranscriptDialect,
    pub max_voices: usize,
    pub continue_on_error: bool,
    dir: TempDir,
}

impl AsyncTestContext for PipelineContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let dir = tempfile::tempdir().expect("Failed to create output directory");

            Self {
                completion: Arc::new(ScriptedCompletionRepository::new()),
                speech: Arc::new(RecordingSpeechRepository::new()),
                transcoder: Arc::new(RecordingTranscoder::new()),
                policy: RetryPolicy::default(),
                dialect: TranscriptDialect::Inline,
                max_voices: 50,
                continue_on_error: false,
                dir,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // The output directory is removed when the TempDir drops
        }
    }
}

impl PipelineContext {
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn transcript_path(&self, title: &str) -> PathBuf {
        self.path(&format!("{}.xml", title))
    }

    pub fn audio_path(&self, title: &str) -> PathBuf {
        self.path(&format!("{}.mp3", title))
    }

    /// Pipeline wired to this context's stubs and output directory
    pub fn pipeline(&self) -> LessonPipeline {
        self.pipeline_with(self.speech.clone(), self.transcoder.clone())
    }

    pub fn pipeline_with(
        &self,
        speech_repo: Arc<dyn SpeechRepository>,
        transcoder: Arc<dyn AudioTranscoder>,
    ) -> LessonPipeline {
        let generator = Arc::new(Generator::new(self.completion.clone(), self.policy));

        LessonPipeline::new(
            Arc::new(LearningPlanService::new(generator.clone(), "gpt-4".to_string())),
            Arc::new(TranscriptService::new(
                generator,
                "gpt-4".to_string(),
                self.dialect,
                ParseOptions::default(),
                VOICE.to_string(),
            )),
            Arc::new(SpeechService::new(speech_repo, self.max_voices)),
            transcoder,
            Arc::new(FileCheckpointRepository::new(self.dir.path())),
            self.continue_on_error,
        )
    }

    /// The plan a run stored in the output directory
    pub fn stored_plan(&self) -> Result<LearningPlan> {
        let path = self.path("learning_plan.json");
        let raw = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&raw).context("decoding stored learning plan")
    }

    /// Names of the files in the output directory, sorted
    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .expect("Failed to list output directory")
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Decode every sample of a WAV buffer
pub fn decode_samples(wav: &[u8]) -> Vec<i16> {
    hound::WavReader::new(std::io::Cursor::new(wav))
        .expect("Failed to parse WAV")
        .samples::<i16>()
        .map(Result::unwrap)
        .collect()
}
