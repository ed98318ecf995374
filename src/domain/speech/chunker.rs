//! Split a markup document into documents the speech engine accepts.

use super::error::ChunkingError;

const SPEAK_OPEN: &str = "<speak";
const VOICE_OPEN: &str = "<voice";
const VOICE_CLOSE: &str = "</voice>";
const SPEAK_CLOSE: &str = "</speak>";

/// Byte range of one `<voice>...</voice>` element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VoiceSpan {
    start: usize,
    end: usize,
}

/// Number of `<voice>` elements in `markup`
pub fn count_voices(markup: &str) -> Result<usize, ChunkingError> {
    Ok(voice_spans(markup)?.len())
}

/// Partition `markup` into ordered documents holding at most `max_voices` voices each.
///
/// Every chunk is wrapped in the original `<speak ...>` root. A document that
/// already fits is returned unchanged.
pub fn split_markup(markup: &str, max_voices: usize) -> Result<Vec<String>, ChunkingError> {
    let root = speak_root(markup)?;
    let spans = voice_spans(markup)?;
    if spans.is_empty() {
        return Err(ChunkingError::NoVoices);
    }

    let max_voices = max_voices.max(1);
    if spans.len() <= max_voices {
        return Ok(vec![markup.to_string()]);
    }

    Ok(spans
        .chunks(max_voices)
        .map(|group| {
            let start = group[0].start;
            let end = group[group.len() - 1].end;
            format!("{}\n  {}\n{}\n", root, &markup[start..end], SPEAK_CLOSE)
        })
        .collect())
}

fn speak_root(markup: &str) -> Result<&str, ChunkingError> {
    let start = markup.find(SPEAK_OPEN).ok_or(ChunkingError::MissingRoot)?;
    let end = markup[start..]
        .find('>')
        .map(|relative| start + relative + 1)
        .ok_or(ChunkingError::MissingRoot)?;
    Ok(&markup[start..end])
}

fn voice_spans(markup: &str) -> Result<Vec<VoiceSpan>, ChunkingError> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    while let Some(relative) = markup[cursor..].find(VOICE_OPEN) {
        let start = cursor + relative;
        let after = &markup[start + VOICE_OPEN.len()..];
        // `<voiceover>` is not a voice element
        if !after.starts_with(|c: char| c.is_whitespace() || c == '>' || c == '/') {
            cursor = start + VOICE_OPEN.len();
            continue;
        }
        let end = markup[start..]
            .find(VOICE_CLOSE)
            .map(|relative| start + relative + VOICE_CLOSE.len())
            .ok_or(ChunkingError::UnclosedVoice { offset: start })?;
        spans.push(VoiceSpan { start, end });
        cursor = end;
    }

    Ok(spans)
}
