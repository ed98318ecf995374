//! Structured dialect: the oracle answers with JSON already in transcript shape.

use super::validate_locale;
use crate::domain::shared::{ParseError, ParseErrorKind};
use crate::domain::transcript::{LanguageBlock, Part, Transcript};
use serde_json::Value;

pub(super) fn parse(raw: &str) -> Result<Transcript, ParseError> {
    let (body, body_offset) = strip_code_fence(raw);
    if body.trim().is_empty() {
        return Err(ParseError::new(ParseErrorKind::EmptyTranscript, 0, ""));
    }

    let value: Value = serde_json::from_str(body).map_err(|e| {
        let offset = body_offset + offset_of(body, e.line(), e.column());
        ParseError::new(ParseErrorKind::MalformedData, offset, line_at(body, e.line()))
            .with_detail(e.to_string())
    })?;

    // `{"transcript": [...]}` is what a JSON-object response mode produces
    let blocks_value = match value {
        Value::Object(mut object) => object.remove("transcript").ok_or_else(|| {
            ParseError::new(ParseErrorKind::MalformedData, body_offset, first_line(body))
                .with_detail("expected a list of {lang, parts} blocks")
        })?,
        other => other,
    };

    let blocks: Vec<LanguageBlock> = serde_json::from_value(blocks_value).map_err(|e| {
        ParseError::new(ParseErrorKind::MalformedData, body_offset, first_line(body))
            .with_detail(e.to_string())
    })?;

    if blocks.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::EmptyTranscript,
            body_offset,
            first_line(body),
        ));
    }

    for (index, block) in blocks.iter().enumerate() {
        let fragment = serde_json::to_string(block).unwrap_or_default();
        validate_locale(&block.lang, body_offset, &fragment)
            .map_err(|e| e.with_detail(format!("block {}", index)))?;
        if block.parts.is_empty() {
            return Err(ParseError::new(ParseErrorKind::EmptyBlock, body_offset, &fragment)
                .with_detail(format!("block {}", index)));
        }
        let blank_pause = block.parts.iter().any(|part| {
            matches!(part, Part::Pause { duration } if duration.trim().is_empty())
        });
        if blank_pause {
            return Err(ParseError::new(ParseErrorKind::MalformedData, body_offset, &fragment)
                .with_detail(format!("block {} has a break without duration", index)));
        }
    }

    Ok(Transcript(blocks))
}

/// Remove a surrounding Markdown code fence, returning the body and its byte offset
fn strip_code_fence(raw: &str) -> (&str, usize) {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return (raw, 0);
    }
    let fence_start = raw.len() - raw.trim_start().len();
    let Some(newline) = trimmed.find('\n') else {
        return (raw, 0);
    };
    let body = &trimmed[newline + 1..];
    let body = body.strip_suffix("```").unwrap_or(body);
    (body, fence_start + newline + 1)
}

/// Byte offset of a 1-based line/column position as reported by serde_json
fn offset_of(body: &str, line: usize, column: usize) -> usize {
    let line_start: usize = body
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(body.len())
}

fn line_at(body: &str, line: usize) -> &str {
    body.lines().nth(line.saturating_sub(1)).unwrap_or("")
}

fn first_line(body: &str) -> &str {
    body.trim_start().lines().next().unwrap_or("")
}
