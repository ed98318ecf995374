use crate::e2e::helpers;

use helpers::fixtures::{self, PLAN_TITLES};
use helpers::stubs::{samples_for, RecordingSpeechRepository, RecordingTranscoder};
use helpers::{decode_samples, PipelineContext};
use lessontape::domain::lesson::PipelineError;
use lessontape::domain::transcript::{parse_transcript, ParseOptions, TranscriptDialect};
use pretty_assertions::assert_eq;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use test_context::test_context;

#[test_context(PipelineContext)]
#[tokio::test]
async fn it_should_render_every_lesson_of_a_fresh_course(ctx: &mut PipelineContext) {
    let summary = ctx
        .pipeline()
        .run(Some(fixtures::goals()), &AtomicBool::new(false))
        .await
        .unwrap();

    assert_eq!(summary.completed, PLAN_TITLES.to_vec());
    assert!(summary.skipped.is_empty());
    assert!(summary.is_success());
    let plan = ctx.stored_plan().unwrap();
    assert_eq!(plan.lessons[2].details, "ha det, vi ses");
    assert_eq!(
        ctx.files(),
        vec![
            "1 - Greetings.mp3",
            "1 - Greetings.xml",
            "2 - Thanks.mp3",
            "2 - Thanks.xml",
            "3 - Goodbye.mp3",
            "3 - Goodbye.xml",
            "learning_goals.json",
            "learning_plan.json",
        ]
    );

    // Stored transcripts read back as markup with the foreign words slowed down
    let markup = std::fs::read_to_string(ctx.transcript_path("2 - Thanks")).unwrap();
    let transcript =
        parse_transcript(&markup, TranscriptDialect::Markup, &ParseOptions::default()).unwrap();
    assert_eq!(transcript.blocks()[1].lang, "nb-NO");
    assert!(markup.contains(r#"<prosody rate="-20%">"#));
    assert!(markup.contains(r#"<break time="1s"/>"#));
}

#[test_context(PipelineContext)]
#[tokio::test]
async fn it_should_not_touch_finished_lessons_on_resume(ctx: &mut PipelineContext) {
    let cancel = AtomicBool::new(false);
    ctx.pipeline()
        .run(Some(fixtures::goals()), &cancel)
        .await
        .unwrap();
    let audio_path = ctx.audio_path("1 - Greetings");
    let bytes = std::fs::read(&audio_path).unwrap();
    let modified = std::fs::metadata(&audio_path).unwrap().modified().unwrap();
    let calls_before = ctx.completion.requests().len();

    let summary = ctx.pipeline().run(None, &cancel).await.unwrap();

    assert_eq!(summary.skipped, PLAN_TITLES.to_vec());
    assert!(summary.completed.is_empty());
    assert_eq!(ctx.completion.requests().len(), calls_before);
    assert_eq!(ctx.speech.documents().len(), 3);
    assert_eq!(std::fs::read(&audio_path).unwrap(), bytes);
    assert_eq!(
        std::fs::metadata(&audio_path).unwrap().modified().unwrap(),
        modified
    );
}

#[test_context(PipelineContext)]
#[tokio::test]
async fn it_should_resume_an_interrupted_run_where_it_stopped(ctx: &mut PipelineContext) {
    let cancel = Arc::new(AtomicBool::new(false));
    let interrupting = Arc::new(RecordingTranscoder::cancelling_after(1, cancel.clone()));

    let first = ctx
        .pipeline_with(ctx.speech.clone(), interrupting)
        .run(Some(fixtures::goals()), &cancel)
        .await
        .unwrap();

    assert!(first.cancelled);
    assert_eq!(first.completed, vec!["1 - Greetings"]);
    assert!(!ctx.audio_path("2 - Thanks").exists());

    let second = ctx
        .pipeline()
        .run(None, &AtomicBool::new(false))
        .await
        .unwrap();

    assert_eq!(second.skipped, vec!["1 - Greetings"]);
    assert_eq!(second.completed, vec!["2 - Thanks", "3 - Goodbye"]);
    assert_eq!(ctx.completion.plan_requests().len(), 1);
    assert_eq!(ctx.completion.transcript_requests().len(), 3);
}

#[test_context(PipelineContext)]
#[tokio::test]
async fn it_should_split_long_lessons_and_merge_their_audio(ctx: &mut PipelineContext) {
    // 60 pairs give 121 blocks, one voice each
    ctx.completion.set_default_transcript(fixtures::long_transcript(60));
    ctx.completion.push_plan(Ok("1 - Numbers: en, to, tre"));

    let summary = ctx
        .pipeline()
        .run(Some(fixtures::goals()), &AtomicBool::new(false))
        .await
        .unwrap();

    assert_eq!(summary.completed, vec!["1 - Numbers"]);
    assert_eq!(ctx.speech.voices_per_request(), vec![50, 50, 21]);
    for document in ctx.speech.documents() {
        assert!(document.starts_with("<speak version=\"1.0\""));
        assert!(document.trim_end().ends_with("</speak>"));
    }

    // The transcoder receives one WAV holding every chunk, in order
    let markup = std::fs::read_to_string(ctx.transcript_path("1 - Numbers")).unwrap();
    let merged = ctx.transcoder.inputs().remove(0);
    assert_eq!(decode_samples(&merged), samples_for(&markup));
}

#[test_context(PipelineContext)]
#[tokio::test]
async fn it_should_keep_going_past_a_failed_lesson_when_asked(ctx: &mut PipelineContext) {
    ctx.continue_on_error = true;
    ctx.completion.push_transcript(Err("503 Service Unavailable"));

    let summary = ctx
        .pipeline()
        .run(Some(fixtures::goals()), &AtomicBool::new(false))
        .await
        .unwrap();

    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].title, "1 - Greetings");
    assert_eq!(summary.completed, vec!["2 - Thanks", "3 - Goodbye"]);
    assert!(!ctx.transcript_path("1 - Greetings").exists());
}

#[test_context(PipelineContext)]
#[tokio::test]
async fn it_should_stop_on_speech_failure_and_keep_the_transcript(ctx: &mut PipelineContext) {
    let failing = Arc::new(RecordingSpeechRepository::failing("401 Unauthorized"));

    let err = ctx
        .pipeline_with(failing, ctx.transcoder.clone())
        .run(Some(fixtures::goals()), &AtomicBool::new(false))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Speech { ref lesson, .. } if lesson == "1 - Greetings"));
    assert!(err.to_string().contains("401"));
    assert!(ctx.transcript_path("1 - Greetings").exists());
    assert!(!ctx.audio_path("1 - Greetings").exists());

    // A later run reuses the stored transcript instead of asking for a new one
    ctx.pipeline()
        .run(None, &AtomicBool::new(false))
        .await
        .unwrap();
    assert_eq!(ctx.completion.transcript_requests().len(), 3);
}
