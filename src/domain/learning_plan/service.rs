use super::parser::parse_plan;
use super::{LearningGoals, LearningPlan};
use crate::domain::generation::{GenerationError, Generator};
use crate::domain::prompts;
use std::sync::Arc;

pub struct LearningPlanService {
    generator: Arc<Generator>,
    model: String,
}

impl LearningPlanService {
    pub fn new(generator: Arc<Generator>, model: String) -> Self {
        Self { generator, model }
    }

    /// Ask the oracle for a plan matching `goals`, repairing unparseable answers
    pub async fn create_plan(&self, goals: &LearningGoals) -> Result<LearningPlan, GenerationError> {
        tracing::info!(
            target_language = %goals.target_language,
            number_of_lessons = goals.number_of_lessons,
            model = %self.model,
            "Generating learning plan"
        );

        let request = prompts::plan_request(&self.model, goals);
        let plan = self.generator.generate_validated(&request, parse_plan).await?;

        if plan.len() != goals.number_of_lessons as usize {
            tracing::warn!(
                requested = goals.number_of_lessons,
                generated = plan.len(),
                "Learning plan lesson count differs from the requested count"
            );
        }
        tracing::info!(lessons = plan.len(), "Learning plan generated");

        Ok(plan)
    }
}
