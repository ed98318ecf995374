pub mod generation;
pub mod learning_plan;
pub mod lesson;
pub mod prompts;
pub mod shared;
pub mod speech;
pub mod transcript;
