use super::{
    parse_transcript, serialize_with_locale, ParseOptions, Transcript, TranscriptDialect,
};
use crate::domain::generation::{GenerationError, Generator};
use crate::domain::learning_plan::{LearningGoals, LearningPlan, LessonDescription};
use crate::domain::prompts;
use crate::domain::shared::ParseError;
use std::sync::Arc;

/// Produces lesson transcripts and their markup form
pub struct TranscriptService {
    generator: Arc<Generator>,
    model: String,
    dialect: TranscriptDialect,
    options: ParseOptions,
    voice: String,
}

impl TranscriptService {
    pub fn new(
        generator: Arc<Generator>,
        model: String,
        dialect: TranscriptDialect,
        options: ParseOptions,
        voice: String,
    ) -> Self {
        Self {
            generator,
            model,
            dialect,
            options,
            voice,
        }
    }

    /// Generate the transcript for `lesson`; output that does not parse is sent back for repair
    pub async fn create_transcript(
        &self,
        goals: &LearningGoals,
        plan: &LearningPlan,
        lesson: &LessonDescription,
    ) -> Result<Transcript, GenerationError> {
        tracing::info!(
            lesson = %lesson.title,
            dialect = %self.dialect,
            model = %self.model,
            "Generating transcript"
        );

        let request = prompts::transcript_request(&self.model, goals, plan, lesson, self.dialect);
        let transcript = self
            .generator
            .generate_validated(&request, |raw| self.parse(raw, self.dialect))
            .await?;

        tracing::info!(
            lesson = %lesson.title,
            blocks = transcript.len(),
            "Transcript generated"
        );
        Ok(transcript)
    }

    pub fn parse(&self, raw: &str, dialect: TranscriptDialect) -> Result<Transcript, ParseError> {
        parse_transcript(raw, dialect, &self.options)
    }

    /// Read back a transcript stored as markup
    pub fn read_markup(&self, markup: &str) -> Result<Transcript, ParseError> {
        self.parse(markup, TranscriptDialect::Markup)
    }

    pub fn to_markup(&self, transcript: &Transcript) -> String {
        serialize_with_locale(transcript, &self.voice, &self.options.base_locale)
    }
}
