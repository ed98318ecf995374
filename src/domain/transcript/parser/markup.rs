//! Markup dialect: read a speech markup document back into a transcript.
//!
//! Accepts what [`crate::domain::transcript::ssml`] writes plus the looser
//! documents the oracle produces when asked for markup directly (prosody
//! around `<lang>`, breaks between languages, several languages per voice).

use super::{attribute, validate_locale, ParseOptions};
use crate::domain::shared::{ParseError, ParseErrorKind};
use crate::domain::transcript::{LanguageBlock, Part, Transcript};
use regex::Regex;
use std::sync::LazyLock;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("tag pattern is valid"));

/// Elements that only group content and carry nothing we keep
const TRANSPARENT_ELEMENTS: &[&str] = &["p", "s", "emphasis", "mstts:express-as"];

struct Element {
    name: String,
    locale: Option<String>,
    rate: Option<String>,
}

/// Where the reader stands relative to the last `<voice>`/`<lang>` tag
#[derive(Clone, Copy, PartialEq, Eq)]
enum Boundary {
    /// Content continues the current block
    None,
    /// An element just opened; the next content starts a block
    Opened,
    /// An element just closed; text starts a block, a pause trails the previous one
    Closed,
}

struct Reader<'a> {
    input: &'a str,
    default_locale: String,
    stack: Vec<Element>,
    blocks: Vec<LanguageBlock>,
    boundary: Boundary,
    seen_root: bool,
}

impl<'a> Reader<'a> {
    fn locale(&self) -> &str {
        self.stack
            .iter()
            .rev()
            .find_map(|element| element.locale.as_deref())
            .unwrap_or(&self.default_locale)
    }

    fn rate(&self) -> Option<String> {
        self.stack.iter().rev().find_map(|element| element.rate.clone())
    }

    fn in_voice(&self) -> bool {
        self.stack.iter().any(|element| element.name == "voice")
    }

    fn malformed(&self, offset: usize, fragment: &str, detail: &str) -> ParseError {
        ParseError::new(ParseErrorKind::MalformedMarkup, offset, fragment)
            .with_detail(detail.to_string())
    }

    fn open_block(&mut self) -> &mut LanguageBlock {
        let locale = self.locale().to_string();
        let reuse = self.boundary == Boundary::None
            && self
                .blocks
                .last()
                .is_some_and(|block| block.lang == locale);
        if !reuse {
            self.blocks.push(LanguageBlock::new(locale, Vec::new()));
        }
        self.boundary = Boundary::None;
        let last = self.blocks.len() - 1;
        &mut self.blocks[last]
    }

    fn push_pause(&mut self, duration: String) {
        if self.boundary != Boundary::Opened {
            if let Some(block) = self.blocks.last_mut() {
                block.parts.push(Part::pause(duration));
                return;
            }
        }
        self.open_block().parts.push(Part::pause(duration));
    }

    fn text(&mut self, offset: usize, raw: &str) -> Result<(), ParseError> {
        let text = unescape(raw.trim());
        if text.is_empty() {
            return Ok(());
        }
        if !self.in_voice() {
            return Err(self.malformed(offset, raw.trim(), "text outside <voice>"));
        }
        let rate = self.rate();
        self.open_block().parts.push(Part::Text { text, rate });
        Ok(())
    }

    fn tag(&mut self, offset: usize, tag: &str) -> Result<(), ParseError> {
        let inner = &tag[1..tag.len() - 1];
        if inner.starts_with('?') || inner.starts_with('!') {
            return Ok(());
        }

        if let Some(name) = inner.strip_prefix('/') {
            let name = name.trim();
            return match self.stack.pop() {
                Some(element) if element.name == name => {
                    if matches!(name, "lang" | "voice") {
                        self.boundary = Boundary::Closed;
                    }
                    Ok(())
                }
                Some(element) => Err(self.malformed(
                    offset,
                    tag,
                    &format!("expected </{}>", element.name),
                )),
                None => Err(self.malformed(offset, tag, "closing tag without open element")),
            };
        }

        let self_closing = inner.ends_with('/');
        let body = inner.trim_end_matches('/');
        let name_end = body
            .find(char::is_whitespace)
            .unwrap_or(body.len());
        let (name, attributes) = body.split_at(name_end);

        if !self.seen_root {
            if name != "speak" {
                return Err(self.malformed(offset, tag, "missing <speak> root"));
            }
            self.seen_root = true;
            if let Some(locale) = attribute(attributes, "xml:lang") {
                validate_locale(&locale, offset, tag)?;
                self.default_locale = locale;
            }
            self.stack.push(Element {
                name: name.to_string(),
                locale: None,
                rate: None,
            });
            return Ok(());
        }

        let element = match name {
            "break" => {
                let duration = attribute(attributes, "time")
                    .filter(|time| !time.trim().is_empty())
                    .ok_or_else(|| self.malformed(offset, tag, "<break> without time"))?;
                if !self.in_voice() {
                    return Err(self.malformed(offset, tag, "<break> outside <voice>"));
                }
                self.push_pause(duration);
                None
            }
            "voice" => {
                self.boundary = Boundary::Opened;
                Some(Element {
                    name: name.to_string(),
                    locale: None,
                    rate: None,
                })
            }
            "lang" => {
                let locale = attribute(attributes, "xml:lang")
                    .ok_or_else(|| ParseError::new(ParseErrorKind::MissingLocale, offset, tag))?;
                validate_locale(&locale, offset, tag)?;
                self.boundary = Boundary::Opened;
                Some(Element {
                    name: name.to_string(),
                    locale: Some(locale),
                    rate: None,
                })
            }
            "prosody" | "mstts:prosody" => Some(Element {
                name: name.to_string(),
                locale: None,
                rate: attribute(attributes, "rate"),
            }),
            name if TRANSPARENT_ELEMENTS.contains(&name) => Some(Element {
                name: name.to_string(),
                locale: None,
                rate: None,
            }),
            other => {
                return Err(self.malformed(offset, tag, &format!("unsupported element <{}>", other)))
            }
        };

        if let Some(element) = element {
            if !self_closing {
                self.stack.push(element);
            }
        }
        Ok(())
    }
}

pub(super) fn parse(input: &str, options: &ParseOptions) -> Result<Transcript, ParseError> {
    let mut reader = Reader {
        input,
        default_locale: options.base_locale.clone(),
        stack: Vec::new(),
        blocks: Vec::new(),
        boundary: Boundary::Opened,
        seen_root: false,
    };

    let mut cursor = 0;
    for tag in TAG_PATTERN.find_iter(input) {
        if tag.start() > cursor {
            reader.text(cursor, &input[cursor..tag.start()])?;
        }
        reader.tag(tag.start(), tag.as_str())?;
        cursor = tag.end();
    }
    if cursor < input.len() {
        reader.text(cursor, &input[cursor..])?;
    }

    if !reader.seen_root {
        return Err(reader.malformed(0, first_line(reader.input), "missing <speak> root"));
    }
    if let Some(element) = reader.stack.last() {
        return Err(reader.malformed(
            input.len(),
            "",
            &format!("unclosed <{}>", element.name),
        ));
    }

    reader.blocks.retain(|block| !block.parts.is_empty());
    if reader.blocks.is_empty() {
        return Err(ParseError::new(ParseErrorKind::EmptyTranscript, 0, first_line(input)));
    }
    Ok(Transcript(reader.blocks))
}

fn first_line(input: &str) -> &str {
    input.trim_start().lines().next().unwrap_or("")
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
