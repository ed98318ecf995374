//! Raw plan text to an ordered lesson list.
//!
//! Two layouts are understood, one lesson per line as `Title: details`
//! (`12 - Directions: left, right, straight ahead`) and a header form where
//! `Lesson: Title` is followed by description lines. Lines that fit neither
//! layout and do not continue a header lesson are model chatter and skipped.

use super::{file_stem, LearningPlan, LessonDescription};
use crate::domain::shared::{ParseError, ParseErrorKind};
use std::collections::HashMap;

const HEADER_PREFIX: &str = "lesson:";
const TITLE_SEPARATOR: &str = ": ";

struct Entry {
    lesson: LessonDescription,
    offset: usize,
    line: String,
    from_header: bool,
}

/// Parse oracle plan text into lessons in the order they appear.
///
/// Any line with a `": "` separator is taken as a lesson, so chatter shaped
/// like `Note: ...` becomes one too. Only lines without the separator are
/// dropped as chatter.
pub fn parse_plan(raw: &str) -> Result<LearningPlan, ParseError> {
    let mut entries: Vec<Entry> = Vec::new();
    let mut offset = 0;

    for raw_line in raw.split_inclusive('\n') {
        let line_offset = offset;
        offset += raw_line.len();

        let line = clean_line(raw_line);
        if line.is_empty() {
            continue;
        }

        let is_header = line
            .get(..HEADER_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(HEADER_PREFIX));
        if is_header {
            entries.push(Entry {
                lesson: LessonDescription::new(line[HEADER_PREFIX.len()..].trim(), ""),
                offset: line_offset,
                line: line.clone(),
                from_header: true,
            });
            continue;
        }

        if let Some(entry) = entries.last_mut().filter(|entry| entry.from_header) {
            if !entry.lesson.details.is_empty() {
                entry.lesson.details.push(' ');
            }
            entry.lesson.details.push_str(&line);
            continue;
        }

        if let Some((title, details)) = line.split_once(TITLE_SEPARATOR) {
            entries.push(Entry {
                lesson: LessonDescription::new(title.trim(), details.trim()),
                offset: line_offset,
                line: line.clone(),
                from_header: false,
            });
        }
    }

    if entries.is_empty() {
        let fragment = raw.trim().lines().next().unwrap_or("");
        return Err(ParseError::new(ParseErrorKind::MalformedPlan, 0, fragment)
            .with_detail("expected one lesson per line as \"N - Title: details\""));
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    for (index, entry) in entries.iter().enumerate() {
        let stem = file_stem(&entry.lesson.title);
        if stem.is_empty() {
            return Err(
                ParseError::new(ParseErrorKind::InvalidTitle, entry.offset, &entry.line)
                    .with_detail(format!("lesson {} has an empty title", index + 1)),
            );
        }
        if entry.lesson.details.is_empty() {
            return Err(
                ParseError::new(ParseErrorKind::MalformedPlan, entry.offset, &entry.line)
                    .with_detail(format!("lesson {:?} has no description", entry.lesson.title)),
            );
        }
        if let Some(previous) = seen.insert(stem.to_lowercase(), index) {
            return Err(
                ParseError::new(ParseErrorKind::InvalidTitle, entry.offset, &entry.line)
                    .with_detail(format!(
                        "title {:?} collides with lesson {}",
                        entry.lesson.title,
                        previous + 1
                    )),
            );
        }
    }

    Ok(LearningPlan::new(
        entries.into_iter().map(|entry| entry.lesson).collect(),
    ))
}

/// Trim a line and drop Markdown decoration the model likes to add
fn clean_line(line: &str) -> String {
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .unwrap_or(line);
    line.replace("**", "").trim().to_string()
}
