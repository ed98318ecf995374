mod cli;

use async_openai::{config::OpenAIConfig, Client};
use clap::Parser;
use cli::{Cli, Commands};
use lessontape::domain::generation::Generator;
use lessontape::domain::learning_plan::{LearningGoals, LearningPlanService, LessonDescription};
use lessontape::domain::lesson::{LessonPipeline, RunSummary};
use lessontape::domain::speech::SpeechService;
use lessontape::domain::transcript::{
    parse_transcript, serialize_with_locale, ParseOptions, TranscriptDialect, TranscriptService,
};
use lessontape::error::{AppError, AppResult};
use lessontape::infrastructure::audio::FfmpegTranscoder;
use lessontape::infrastructure::config::{Config, LogFormat, DEFAULT_VOICE};
use lessontape::infrastructure::repositories::{
    AzureSpeechRepository, FileCheckpointRepository, OpenAiCompletionRepository,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXIT_LESSONS_FAILED: i32 = 2;
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "lessontape failed");
            eprintln!("error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn execute(cli: Cli) -> AppResult<i32> {
    match cli.command {
        Commands::Render {
            file,
            dialect,
            voice,
        } => {
            init_logging(&log_format_from_env());
            render(file, dialect, voice).await
        }
        Commands::Run { goals, output_dir } => {
            let config = load_config(output_dir)?;
            let pipeline = build_pipeline(&config);
            let summary = pipeline
                .run(goals.into_goals()?, &cancel_on_ctrl_c())
                .await?;
            Ok(report(&summary))
        }
        Commands::Resume { output_dir } => {
            let config = load_config(Some(output_dir))?;
            let pipeline = build_pipeline(&config);
            let summary = pipeline.run(None, &cancel_on_ctrl_c()).await?;
            Ok(report(&summary))
        }
        Commands::Plan { goals, output_dir } => {
            let config = load_config(output_dir)?;
            let pipeline = build_pipeline(&config);
            let (goals, plan) = pipeline.prepare_plan(goals.into_goals()?).await?;
            print_plan(&goals, &plan.lessons);
            Ok(0)
        }
    }
}

fn load_config(output_dir: Option<PathBuf>) -> AppResult<Config> {
    let mut config = Config::from_env().map_err(|e| AppError::Config(e.to_string()))?;
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }

    init_logging(&config.log_format);
    tracing::info!(
        output_dir = %config.output_dir.display(),
        model = %config.openai_model,
        voice = %config.speech_voice,
        dialect = %config.transcript_dialect,
        "Starting lessontape"
    );
    Ok(config)
}

fn build_pipeline(config: &Config) -> LessonPipeline {
    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories
    tracing::info!("Instantiating repositories...");
    let openai_client = Arc::new(Client::with_config(
        OpenAIConfig::new().with_api_key(config.openai_api_key.clone()),
    ));
    let completion_repo = Arc::new(OpenAiCompletionRepository::new(openai_client));
    let speech_repo = Arc::new(AzureSpeechRepository::new(
        config.azure_speech_key.clone(),
        &config.azure_speech_region,
    ));
    let checkpoint_repo = Arc::new(FileCheckpointRepository::new(config.output_dir.clone()));
    let transcoder = Arc::new(FfmpegTranscoder::new(config.ffmpeg_path.clone()));

    // 2. Instantiate services
    tracing::info!("Instantiating services...");
    let generator = Arc::new(Generator::new(completion_repo, config.retry_policy()));
    let plan_service = Arc::new(LearningPlanService::new(
        generator.clone(),
        config.openai_model.clone(),
    ));
    let transcript_service = Arc::new(TranscriptService::new(
        generator,
        config.openai_model.clone(),
        config.transcript_dialect,
        config.parse_options(),
        config.speech_voice.clone(),
    ));
    let speech_service = Arc::new(SpeechService::new(
        speech_repo,
        config.max_voices_per_request,
    ));

    // 3. Wire the pipeline
    LessonPipeline::new(
        plan_service,
        transcript_service,
        speech_service,
        transcoder,
        checkpoint_repo,
        config.continue_on_error,
    )
}

/// Cancellation flag raised by the first Ctrl-C
fn cancel_on_ctrl_c() -> Arc<AtomicBool> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing the current lesson before stopping");
            flag.store(true, Ordering::SeqCst);
        }
    });
    cancel
}

async fn render(
    file: PathBuf,
    dialect: Option<TranscriptDialect>,
    voice: Option<String>,
) -> AppResult<i32> {
    let raw = tokio::fs::read_to_string(&file).await?;
    let dialect = dialect.unwrap_or_else(|| TranscriptDialect::detect(&raw));
    let options = ParseOptions::default();

    tracing::info!(file = %file.display(), dialect = %dialect, "Rendering transcript");
    let transcript = parse_transcript(&raw, dialect, &options)?;

    let voice = voice.unwrap_or_else(|| DEFAULT_VOICE.to_string());
    print!(
        "{}",
        serialize_with_locale(&transcript, &voice, &options.base_locale)
    );
    Ok(0)
}

fn report(summary: &RunSummary) -> i32 {
    println!(
        "completed: {}, skipped: {}, failed: {}",
        summary.completed.len(),
        summary.skipped.len(),
        summary.failed.len()
    );
    for failure in &summary.failed {
        println!("  failed {}: {}", failure.title, failure.reason);
    }

    if summary.cancelled {
        println!("run cancelled, resume with the same output directory");
        EXIT_CANCELLED
    } else if !summary.failed.is_empty() {
        EXIT_LESSONS_FAILED
    } else {
        0
    }
}

fn print_plan(goals: &LearningGoals, lessons: &[LessonDescription]) {
    println!("{} lessons for {}:", lessons.len(), goals.target_language);
    for lesson in lessons {
        println!("  {}: {}", lesson.title, lesson.details);
    }
}

fn log_format_from_env() -> LogFormat {
    dotenvy::dotenv().ok();
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => LogFormat::Json,
        _ => LogFormat::Pretty,
    }
}

fn init_logging(log_format: &LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lessontape=debug".into());

    if *log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}
