use super::{LanguageBlock, Part, Transcript, DEFAULT_BASE_LOCALE};

const SSML_NAMESPACE: &str = "http://www.w3.org/2001/10/synthesis";
const MSTTS_NAMESPACE: &str = "http://www.w3.org/2001/mstts";
const INDENT: &str = "  ";

/// Serialize a transcript into a speech markup document spoken by `voice`
pub fn serialize(transcript: &Transcript, voice: &str) -> String {
    serialize_with_locale(transcript, voice, DEFAULT_BASE_LOCALE)
}

/// Same as [`serialize`] with an explicit root `xml:lang`
///
/// Each block becomes its own `<voice>` element so the speech engine can
/// chunk on voice boundaries without splitting a language span.
pub fn serialize_with_locale(transcript: &Transcript, voice: &str, base_locale: &str) -> String {
    let mut out = format!(
        "<speak version=\"1.0\" xmlns=\"{}\" xmlns:mstts=\"{}\" xml:lang=\"{}\">\n",
        SSML_NAMESPACE,
        MSTTS_NAMESPACE,
        escape_attribute(base_locale)
    );
    for block in transcript.blocks().iter().filter(|block| is_renderable(block)) {
        write_block(&mut out, block, voice);
    }
    out.push_str("</speak>\n");
    out
}

/// Blocks with nothing to speak or pause on would become empty voices
fn is_renderable(block: &LanguageBlock) -> bool {
    block.parts.iter().any(|part| match part {
        Part::Pause { .. } => true,
        Part::Text { text, .. } => !text.trim().is_empty(),
    })
}

fn push_line(out: &mut String, depth: usize, content: &str) {
    out.push_str(&INDENT.repeat(depth));
    out.push_str(content);
    out.push('\n');
}

fn write_block(out: &mut String, block: &LanguageBlock, voice: &str) {
    push_line(out, 1, &format!(r#"<voice name="{}">"#, escape_attribute(voice)));
    push_line(
        out,
        2,
        &format!(r#"<lang xml:lang="{}">"#, escape_attribute(&block.lang)),
    );
    for part in &block.parts {
        write_part(out, part, 3);
    }
    push_line(out, 2, "</lang>");
    push_line(out, 1, "</voice>");
}

fn write_part(out: &mut String, part: &Part, depth: usize) {
    match part {
        Part::Pause { duration } => {
            push_line(
                out,
                depth,
                &format!(r#"<break time="{}"/>"#, escape_attribute(duration)),
            );
        }
        Part::Text { text, rate } => {
            let text = text.trim();
            if text.is_empty() {
                return;
            }
            match rate {
                Some(rate) => {
                    push_line(
                        out,
                        depth,
                        &format!(r#"<prosody rate="{}">"#, escape_attribute(rate)),
                    );
                    push_line(out, depth + 1, &escape_text(text));
                    push_line(out, depth, "</prosody>");
                }
                None => push_line(out, depth, &escape_text(text)),
            }
        }
    }
}

pub(crate) fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub(crate) fn escape_attribute(value: &str) -> String {
    escape_text(value)
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
