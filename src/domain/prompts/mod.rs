//! Prompt templates for every oracle call the pipeline makes.

use crate::domain::generation::{ChatMessage, CompletionRequest};
use crate::domain::learning_plan::{LearningGoals, LearningPlan, LessonDescription};
use crate::domain::shared::ParseError;
use crate::domain::transcript::{TranscriptDialect, SUPPORTED_LOCALES};

/// How many earlier lessons a transcript prompt mentions
pub const PRIOR_LESSON_WINDOW: usize = 5;

const PLAN_TEMPERATURE: f32 = 0.2;

/// Request for a numbered lesson plan
pub fn plan_request(model: &str, goals: &LearningGoals) -> CompletionRequest {
    let prompt = format!(
        r#"You are a bot designed to create a learning plan for learning a specified language.
You are given details about a user's learning goals and respond with a list of lessons.
A tutor bot will later turn each lesson description into a transcript and audio.

The point is to create short (1-5 minute) audio listening lessons.
That usually means only a few (2-5) new words or sentences per lesson, so create several lessons on the same topic.
Be specific about what each lesson should contain.
Later lessons may get more advanced, for example longer sentences or conversations using what was learned before.
Create {count} lessons.

Reply with one lesson per line, numbered, in the form "N - Title: details". Lesson titles must be unique.
An excerpt from a plan for someone learning Japanese for a holiday trip:
20 - Adverbs of place: Where, here, there
21 - Adverbs of place 2: Above, below, inside and outside
22 - Directions: Left, right, straight ahead and turn

Target language: {language}.
Prior knowledge: {prior}.
Target knowledge: {target}.

Now, create the learning plan:"#,
        count = goals.number_of_lessons,
        language = goals.target_language,
        prior = goals.prior_knowledge,
        target = goals.target_knowledge,
    );

    CompletionRequest::new(model, vec![ChatMessage::system(prompt)])
        .with_temperature(PLAN_TEMPERATURE)
        .with_penalties(0.0, 0.0)
}

/// Request for the transcript of `lesson`, written in `dialect`
pub fn transcript_request(
    model: &str,
    goals: &LearningGoals,
    plan: &LearningPlan,
    lesson: &LessonDescription,
    dialect: TranscriptDialect,
) -> CompletionRequest {
    let index = plan.position(&lesson.title).unwrap_or(plan.len());
    let prior = plan.preceding(index, PRIOR_LESSON_WINDOW);
    let prior_message = if prior.is_empty() {
        String::new()
    } else {
        let covered: Vec<&str> = prior.iter().map(|l| l.details.as_str()).collect();
        format!("Earlier lessons already covered: {}.\n", covered.join("; "))
    };
    let intro = if prior.is_empty() {
        "Welcome to the course"
    } else {
        "Now, let's learn"
    };

    let prompt = format!(
        r#"You are a bot designed to create transcripts for audio listening lessons for learning a specified language.
The transcript is converted to audio by a text to speech system.
The base language is english (en-US); use both english and the target language in the lesson.
The target language locale must be one of: {locales}.

{format}

Keep fluff to a minimum and do not give a long introduction. Start with something like "{intro} ...".
End the lesson by briefly summarizing what was learned.
A lesson contains repetition and pauses. After learning new words, repeat them again later in the lesson.
When learning a new word, a sentence using the word helps.
Use the target language's own script, for example 食べます rather than "Tabemasu".

The lesson is part of a series for learning {language}.
{prior_message}The listener has prior knowledge: {prior_knowledge}.
The lesson should talk about: {title}: {details}

Now, give me the transcript for the lesson:"#,
        locales = SUPPORTED_LOCALES.join(", "),
        format = format_instructions(dialect),
        intro = intro,
        language = goals.target_language,
        prior_message = prior_message,
        prior_knowledge = goals.prior_knowledge,
        title = lesson.title,
        details = lesson.details,
    );

    CompletionRequest::new(model, vec![ChatMessage::system(prompt)])
}

/// User message sent after output failed validation
pub fn repair_instruction(error: &ParseError) -> String {
    format!(
        "Parsing your previous answer failed with:\n{}\n\nGive me the corrected version. Only give the corrected content, no other text or characters.",
        error
    )
}

fn format_instructions(dialect: TranscriptDialect) -> &'static str {
    match dialect {
        TranscriptDialect::Inline => {
            r#"Write the transcript as plain english text. Wrap every word or sentence in the target language in a lang tag with its locale, for example:
In Japanese, "thank you" is <lang lang="ja-JP">ありがとうございます</lang>.
Never put english inside a lang tag and never leave target language words outside one. Lang tags cannot be nested."#
        }
        TranscriptDialect::Json => {
            r#"Reply with JSON only, a list of language blocks:
[{"lang":"en-US","parts":[{"text":"In Japanese, thank you is"}]},{"lang":"ja-JP","parts":[{"break":"1s"},{"rate":"-20%","text":"ありがとうございます"}]}]
A part is either {"text": "...", "rate": "-20%"} where rate is optional, or {"break": "1s"}.
Never mix english and the target language in the same block; start a new block whenever the language changes."#
        }
        TranscriptDialect::Markup => {
            r#"Reply with an SSML document only. Use one <voice> element per language change and switch language with <lang xml:lang="...">:
<speak version="1.0" xmlns="http://www.w3.org/2001/10/synthesis" xml:lang="en-US"><voice name="en-US-RyanMultilingualNeural"><lang xml:lang="en-US">Thank you is</lang></voice><voice name="en-US-RyanMultilingualNeural"><lang xml:lang="ja-JP"><prosody rate="-20%">ありがとうございます</prosody></lang></voice></speak>"#
        }
    }
}
