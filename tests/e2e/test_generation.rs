use crate::e2e::helpers;

use helpers::fixtures;
use helpers::PipelineContext;
use lessontape::domain::generation::{ChatRole, GenerationError, RetryPolicy, TransportRetry};
use lessontape::domain::lesson::{PipelineError, Stage};
use lessontape::domain::shared::ParseErrorKind;
use lessontape::domain::transcript::TranscriptDialect;
use pretty_assertions::assert_eq;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use test_context::test_context;

#[test_context(PipelineContext)]
#[tokio::test]
async fn it_should_repair_a_transcript_with_an_unclosed_tag(ctx: &mut PipelineContext) {
    ctx.completion.push_plan(Ok("1 - Greetings: hei"));
    ctx.completion
        .push_transcript(Ok(r#"Hello is <lang lang="nb-NO">hei"#));

    let summary = ctx
        .pipeline()
        .run(Some(fixtures::goals()), &AtomicBool::new(false))
        .await
        .unwrap();

    assert_eq!(summary.completed, vec!["1 - Greetings"]);
    let requests = ctx.completion.transcript_requests();
    assert_eq!(requests.len(), 2);

    // The repair carries the rejected output and the reason it was rejected
    let repair = &requests[1].messages;
    assert_eq!(repair.len(), 3);
    assert_eq!(repair[1].role, ChatRole::Assistant);
    assert_eq!(repair[1].content, r#"Hello is <lang lang="nb-NO">hei"#);
    assert_eq!(repair[2].role, ChatRole::User);
    assert!(repair[2].content.contains("unclosed <lang> tag"));
}

#[test_context(PipelineContext)]
#[tokio::test]
async fn it_should_give_up_after_the_attempt_budget(ctx: &mut PipelineContext) {
    ctx.policy = RetryPolicy {
        max_attempts: 2,
        transport: TransportRetry::Abort,
    };
    ctx.completion.push_plan(Ok("Sure! I'd love to help you learn Norwegian."));
    ctx.completion.push_plan(Ok("Lessons coming soon."));

    let err = ctx
        .pipeline()
        .run(Some(fixtures::goals()), &AtomicBool::new(false))
        .await
        .unwrap_err();

    match err {
        PipelineError::Generation {
            stage: Stage::Plan,
            source:
                GenerationError::Exhausted {
                    attempts,
                    last_raw_output,
                    last_error,
                },
            ..
        } => {
            assert_eq!(attempts, 2);
            assert_eq!(last_raw_output, "Lessons coming soon.");
            assert_eq!(last_error.kind, ParseErrorKind::MalformedPlan);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(ctx.completion.plan_requests().len(), 2);
    // Goals are kept so the run can be resumed, the plan is not written
    assert!(ctx.path("learning_goals.json").exists());
    assert!(!ctx.path("learning_plan.json").exists());
}

#[test_context(PipelineContext)]
#[tokio::test]
async fn it_should_retry_transport_failures_without_spending_attempts(ctx: &mut PipelineContext) {
    ctx.policy = RetryPolicy {
        max_attempts: 1,
        transport: TransportRetry::Backoff {
            max_retries: 2,
            initial_delay: Duration::from_millis(1),
        },
    };
    ctx.completion.push_plan(Err("connection reset"));
    ctx.completion.push_plan(Ok("   "));

    let summary = ctx
        .pipeline()
        .run(Some(fixtures::goals()), &AtomicBool::new(false))
        .await
        .unwrap();

    assert_eq!(summary.completed.len(), 3);
    assert_eq!(ctx.completion.plan_requests().len(), 3);
}

#[test_context(PipelineContext)]
#[tokio::test]
async fn it_should_abort_on_transport_failure_by_default(ctx: &mut PipelineContext) {
    ctx.completion.push_plan(Err("401 invalid api key"));

    let err = ctx
        .pipeline()
        .run(Some(fixtures::goals()), &AtomicBool::new(false))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Generation {
            source: GenerationError::Transport { calls: 1, .. },
            ..
        }
    ));
    assert_eq!(ctx.completion.requests().len(), 1);
}

#[test_context(PipelineContext)]
#[tokio::test]
async fn it_should_accept_json_transcripts(ctx: &mut PipelineContext) {
    ctx.dialect = TranscriptDialect::Json;
    ctx.completion.push_plan(Ok("1 - Greetings: hei"));
    ctx.completion.set_default_transcript(
        r#"```json
[{"lang":"en-US","parts":[{"text":"Hello is"}]},{"lang":"nb-NO","parts":[{"break":"1s"},{"text":"hei","rate":"-20%"}]}]
```"#,
    );

    ctx.pipeline()
        .run(Some(fixtures::goals()), &AtomicBool::new(false))
        .await
        .unwrap();

    let markup = std::fs::read_to_string(ctx.transcript_path("1 - Greetings")).unwrap();
    assert!(markup.contains(r#"<lang xml:lang="nb-NO">"#));
    assert!(markup.contains(r#"<break time="1s"/>"#));
    let prompt = &ctx.completion.transcript_requests()[0].messages[0].content;
    assert!(prompt.contains("Reply with JSON only"));
}
