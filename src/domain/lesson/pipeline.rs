use super::error::{PipelineError, Stage};
use super::{LessonFailure, RunSummary};
use crate::domain::learning_plan::{LearningGoals, LearningPlan, LearningPlanService, LessonDescription};
use crate::domain::speech::SpeechService;
use crate::domain::transcript::TranscriptService;
use crate::infrastructure::audio::AudioTranscoder;
use crate::infrastructure::repositories::CheckpointRepository;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

enum LessonOutcome {
    Completed,
    Skipped,
}

/// Drives a course from goals to one audio file per lesson.
///
/// Every artifact goes through the checkpoint repository before the next
/// stage starts, so a run interrupted at any point can be resumed against
/// the same output directory without repeating finished work.
pub struct LessonPipeline {
    plan_service: Arc<LearningPlanService>,
    transcript_service: Arc<TranscriptService>,
    speech_service: Arc<SpeechService>,
    transcoder: Arc<dyn AudioTranscoder>,
    checkpoint_repo: Arc<dyn CheckpointRepository>,
    continue_on_error: bool,
}

impl LessonPipeline {
    pub fn new(
        plan_service: Arc<LearningPlanService>,
        transcript_service: Arc<TranscriptService>,
        speech_service: Arc<SpeechService>,
        transcoder: Arc<dyn AudioTranscoder>,
        checkpoint_repo: Arc<dyn CheckpointRepository>,
        continue_on_error: bool,
    ) -> Self {
        Self {
            plan_service,
            transcript_service,
            speech_service,
            transcoder,
            checkpoint_repo,
            continue_on_error,
        }
    }

    /// Resolve the goals and plan for this output directory.
    ///
    /// Stored goals are authoritative once written. A stored plan is reused as is;
    /// otherwise one is generated and persisted together with the goals.
    pub async fn prepare_plan(
        &self,
        goals: Option<LearningGoals>,
    ) -> Result<(LearningGoals, LearningPlan), PipelineError> {
        // 1. Resolve goals
        let stored_goals = self
            .checkpoint_repo
            .load_goals()
            .await
            .map_err(PipelineError::Checkpoint)?;
        let goals_are_stored = stored_goals.is_some();
        let goals = match (stored_goals, goals) {
            (Some(stored), Some(given)) => {
                if stored != given {
                    tracing::warn!(
                        stored_language = %stored.target_language,
                        given_language = %given.target_language,
                        "Ignoring given learning goals, the output directory already has goals"
                    );
                }
                stored
            }
            (Some(stored), None) => stored,
            (None, Some(given)) => given,
            (None, None) => return Err(PipelineError::MissingGoals),
        };
        goals.validate().map_err(PipelineError::InvalidGoals)?;

        // 2. Reuse a stored plan
        if let Some(plan) = self
            .checkpoint_repo
            .load_plan()
            .await
            .map_err(PipelineError::Checkpoint)?
        {
            tracing::info!(lessons = plan.len(), "Resuming with stored learning plan");
            if !goals_are_stored {
                self.checkpoint_repo
                    .save_goals(&goals)
                    .await
                    .map_err(PipelineError::Checkpoint)?;
            }
            return Ok((goals, plan));
        }

        // 3. Generate and persist
        if !goals_are_stored {
            self.checkpoint_repo
                .save_goals(&goals)
                .await
                .map_err(PipelineError::Checkpoint)?;
        }
        let plan = self
            .plan_service
            .create_plan(&goals)
            .await
            .map_err(|source| PipelineError::Generation {
                stage: Stage::Plan,
                lesson: None,
                source,
            })?;
        self.checkpoint_repo
            .save_plan(&plan)
            .await
            .map_err(PipelineError::Checkpoint)?;

        Ok((goals, plan))
    }

    /// Run every lesson of the plan that has no audio yet.
    ///
    /// `cancel` is checked between lessons; a lesson in flight always finishes
    /// or fails before the run stops.
    pub async fn run(
        &self,
        goals: Option<LearningGoals>,
        cancel: &AtomicBool,
    ) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::start();
        let (goals, plan) = self.prepare_plan(goals).await?;

        tracing::info!(
            target_language = %goals.target_language,
            lessons = plan.len(),
            continue_on_error = self.continue_on_error,
            "Starting lesson run"
        );

        for (index, lesson) in plan.lessons.iter().enumerate() {
            if cancel.load(Ordering::SeqCst) {
                tracing::warn!(
                    remaining = plan.len() - index,
                    "Run cancelled, stopping before next lesson"
                );
                summary.cancelled = true;
                break;
            }

            match self.process_lesson(&goals, &plan, lesson).await {
                Ok(LessonOutcome::Completed) => summary.completed.push(lesson.title.clone()),
                Ok(LessonOutcome::Skipped) => summary.skipped.push(lesson.title.clone()),
                Err(e) if self.continue_on_error => {
                    tracing::error!(lesson = %lesson.title, error = %e, "Lesson failed, continuing");
                    summary.failed.push(LessonFailure {
                        title: lesson.title.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::error!(lesson = %lesson.title, error = %e, "Lesson failed, aborting run");
                    return Err(e);
                }
            }
        }

        let summary = summary.finish();
        tracing::info!(
            completed = summary.completed.len(),
            skipped = summary.skipped.len(),
            failed = summary.failed.len(),
            cancelled = summary.cancelled,
            "Lesson run finished"
        );
        Ok(summary)
    }

    async fn process_lesson(
        &self,
        goals: &LearningGoals,
        plan: &LearningPlan,
        lesson: &LessonDescription,
    ) -> Result<LessonOutcome, PipelineError> {
        let start_time = std::time::Instant::now();
        let stem = lesson.file_stem();

        // 1. Audio present means the lesson is done
        if self
            .checkpoint_repo
            .has_audio(&stem)
            .await
            .map_err(PipelineError::Checkpoint)?
        {
            tracing::info!(lesson = %lesson.title, "Audio already present, skipping lesson");
            return Ok(LessonOutcome::Skipped);
        }

        // 2. Transcript, stored or freshly generated
        let markup = self.transcript_markup(goals, plan, lesson, &stem).await?;

        // 3. Speech
        let wav = self
            .speech_service
            .synthesize(&markup)
            .await
            .map_err(|source| PipelineError::Speech {
                lesson: lesson.title.clone(),
                source,
            })?;

        // 4. Transcode and store
        let audio = self
            .transcoder
            .transcode(wav)
            .await
            .map_err(|reason| PipelineError::Transcode {
                lesson: lesson.title.clone(),
                reason,
            })?;
        self.checkpoint_repo
            .save_audio(&stem, &audio)
            .await
            .map_err(PipelineError::Checkpoint)?;

        tracing::info!(
            lesson = %lesson.title,
            audio_size_bytes = audio.len(),
            latency_ms = start_time.elapsed().as_millis() as u64,
            "Lesson completed"
        );
        Ok(LessonOutcome::Completed)
    }

    async fn transcript_markup(
        &self,
        goals: &LearningGoals,
        plan: &LearningPlan,
        lesson: &LessonDescription,
        stem: &str,
    ) -> Result<String, PipelineError> {
        if let Some(stored) = self
            .checkpoint_repo
            .load_transcript(stem)
            .await
            .map_err(PipelineError::Checkpoint)?
        {
            match self.transcript_service.read_markup(&stored) {
                Ok(_) => {
                    tracing::info!(lesson = %lesson.title, "Reusing stored transcript");
                    return Ok(stored);
                }
                Err(e) => {
                    tracing::warn!(
                        lesson = %lesson.title,
                        error = %e,
                        "Stored transcript is unreadable, regenerating"
                    );
                }
            }
        }

        let transcript = self
            .transcript_service
            .create_transcript(goals, plan, lesson)
            .await
            .map_err(|source| PipelineError::Generation {
                stage: Stage::Transcript,
                lesson: Some(lesson.title.clone()),
                source,
            })?;
        let markup = self.transcript_service.to_markup(&transcript);
        self.checkpoint_repo
            .save_transcript(stem, &markup)
            .await
            .map_err(PipelineError::Checkpoint)?;

        Ok(markup)
    }
}
