use lessontape::domain::learning_plan::LearningGoals;

pub const PLAN: &str = "Here is your plan:\n\
1 - Greetings: hei, hallo, god morgen\n\
2 - Thanks: takk, tusen takk\n\
3 - Goodbye: ha det, vi ses\n";

pub const PLAN_TITLES: [&str; 3] = ["1 - Greetings", "2 - Thanks", "3 - Goodbye"];

pub const SHORT_TRANSCRIPT: &str =
    r#"Welcome to the course. Hello is <lang lang="nb-NO">hei</lang>. Again: <lang lang="nb-NO">hei</lang>."#;

pub fn goals() -> LearningGoals {
    LearningGoals {
        target_language: "Norwegian".to_string(),
        prior_knowledge: "none".to_string(),
        target_knowledge: "basic politeness".to_string(),
        number_of_lessons: 3,
    }
}

/// Inline transcript alternating languages `pairs` times, so `2 * pairs + 1` blocks
pub fn long_transcript(pairs: usize) -> String {
    let mut transcript = String::from("Let's practice.");
    for i in 0..pairs {
        transcript.push_str(&format!(
            r#" Word {} is <lang lang="nb-NO">ord nummer {}</lang>."#,
            i, i
        ));
    }
    transcript
}
