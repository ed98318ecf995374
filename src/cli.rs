use clap::{Args, Parser, Subcommand};
use lessontape::domain::learning_plan::LearningGoals;
use lessontape::domain::transcript::TranscriptDialect;
use lessontape::error::AppError;
use std::path::PathBuf;

/// Generate spoken language lessons from a set of learning goals
#[derive(Parser, Debug)]
#[command(name = "lessontape", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan the course and render every lesson to audio
    Run {
        #[command(flatten)]
        goals: GoalArgs,

        /// Directory holding checkpoints and lesson audio (overrides OUTPUT_DIR)
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
    /// Only create and store the learning plan
    Plan {
        #[command(flatten)]
        goals: GoalArgs,

        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
    /// Continue a run from the goals and plan stored in the output directory
    Resume {
        #[arg(long, value_name = "DIR")]
        output_dir: PathBuf,
    },
    /// Parse a transcript file offline and print it as speech markup
    Render {
        /// Transcript in inline, JSON or markup form
        file: PathBuf,

        /// Dialect of the file, detected from its content when omitted
        #[arg(long, value_name = "DIALECT")]
        dialect: Option<TranscriptDialect>,

        /// Voice used for every block
        #[arg(long, value_name = "VOICE")]
        voice: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
pub struct GoalArgs {
    /// Language to learn, e.g. "Japanese"
    #[arg(long, value_name = "LANGUAGE")]
    pub language: Option<String>,

    /// What the learner already knows
    #[arg(long, value_name = "TEXT", default_value = "none")]
    pub prior_knowledge: String,

    /// What the learner wants to be able to do
    #[arg(long, value_name = "TEXT")]
    pub target_knowledge: Option<String>,

    /// Number of lessons to plan
    #[arg(long, value_name = "COUNT", default_value = "10")]
    pub lessons: u32,
}

impl GoalArgs {
    /// Goals from the flags; `None` when no language is given so stored goals apply
    pub fn into_goals(self) -> Result<Option<LearningGoals>, AppError> {
        let Some(target_language) = self.language else {
            if self.target_knowledge.is_some() {
                return Err(AppError::InvalidInput(
                    "--target-knowledge needs --language".to_string(),
                ));
            }
            return Ok(None);
        };

        Ok(Some(LearningGoals {
            target_knowledge: self
                .target_knowledge
                .unwrap_or_else(|| format!("conversational {}", target_language)),
            target_language,
            prior_knowledge: self.prior_knowledge,
            number_of_lessons: self.lessons,
        }))
    }
}
