//! Inline-tag dialect: plain text with `<lang lang="ja-JP">...</lang>` spans.
//!
//! A single forward pass. The tokenizer yields literal text and the two tag
//! kinds; the parser is a two-state machine (`Base`, `Foreign`) over those
//! tokens.

use super::{attribute, validate_locale, ParseOptions};
use crate::domain::shared::{ParseError, ParseErrorKind};
use crate::domain::transcript::{LanguageBlock, Part, Transcript};

const OPEN_PREFIX: &str = "<lang";
const CLOSE_TAG: &str = "</lang>";

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Open { start: usize, end: usize, locale: String },
    Close { start: usize, end: usize },
}

struct Tokenizer<'a> {
    input: &'a str,
    cursor: usize,
    /// Tag found while scanning text, emitted on the next call
    pending: Option<Token<'a>>,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            cursor: 0,
            pending: None,
        }
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        if let Some(token) = self.pending.take() {
            return Ok(Some(token));
        }
        if self.cursor >= self.input.len() {
            return Ok(None);
        }

        let input = self.input;
        let text_start = self.cursor;
        let rest = &input[text_start..];
        for (relative, _) in rest.match_indices('<') {
            let at = text_start + relative;
            if let Some(tag) = self.tag_at(at)? {
                self.cursor = match &tag {
                    Token::Open { end, .. } | Token::Close { end, .. } => *end,
                    Token::Text(_) => unreachable!("tag_at never yields text"),
                };
                if at == text_start {
                    return Ok(Some(tag));
                }
                self.pending = Some(tag);
                return Ok(Some(Token::Text(&input[text_start..at])));
            }
        }

        self.cursor = input.len();
        Ok(Some(Token::Text(rest)))
    }

    /// Recognise a `<lang ...>` or `</lang>` tag starting at byte `at`
    fn tag_at(&self, at: usize) -> Result<Option<Token<'a>>, ParseError> {
        let rest = &self.input[at..];
        if rest.starts_with(CLOSE_TAG) {
            return Ok(Some(Token::Close {
                start: at,
                end: at + CLOSE_TAG.len(),
            }));
        }
        if !rest.starts_with(OPEN_PREFIX) {
            return Ok(None);
        }
        // `<language>` and friends are literal text
        match rest[OPEN_PREFIX.len()..].chars().next() {
            Some(c) if c.is_whitespace() || c == '>' || c == '/' => {}
            _ => return Ok(None),
        }

        let after_prefix = at + OPEN_PREFIX.len();
        let tag_len = self.input[after_prefix..]
            .find(|c| c == '>' || c == '<')
            .filter(|&i| self.input[after_prefix + i..].starts_with('>'))
            .ok_or_else(|| {
                ParseError::new(ParseErrorKind::UnterminatedTag, at, line_of(rest))
            })?;
        let end = after_prefix + tag_len + 1;
        let tag_text = &self.input[at..end];
        let attributes = &self.input[after_prefix..end - 1];

        if attributes.trim_end().ends_with('/') {
            return Err(ParseError::new(ParseErrorKind::UnclosedLang, at, tag_text)
                .with_detail("self-closing <lang/> has no content"));
        }

        let locale = attribute(attributes, "lang")
            .or_else(|| attribute(attributes, "xml:lang"))
            .map(|value| value.trim().to_string())
            .ok_or_else(|| ParseError::new(ParseErrorKind::MissingLocale, at, tag_text))?;
        validate_locale(&locale, at, tag_text)?;

        Ok(Some(Token::Open {
            start: at,
            end,
            locale,
        }))
    }
}

fn line_of(s: &str) -> &str {
    s.lines().next().unwrap_or(s)
}

enum State {
    Base,
    Foreign {
        open_at: usize,
        locale: String,
        text: String,
    },
}

pub(super) fn parse(input: &str, options: &ParseOptions) -> Result<Transcript, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::new(ParseErrorKind::EmptyTranscript, 0, ""));
    }

    let mut tokens = Tokenizer::new(input);
    let mut blocks = Vec::new();
    let mut state = State::Base;
    let mut base_text: Option<&str> = None;

    while let Some(token) = tokens.next_token()? {
        state = match (state, token) {
            (State::Base, Token::Text(text)) => {
                base_text = Some(text);
                State::Base
            }
            (State::Base, Token::Open { start, locale, .. }) => {
                if let Some(text) = base_text.take() {
                    blocks.push(LanguageBlock::new(
                        options.base_locale.clone(),
                        vec![
                            Part::pause(options.pause.clone()),
                            Part::text(text),
                            Part::pause(options.pause.clone()),
                        ],
                    ));
                }
                State::Foreign {
                    open_at: start,
                    locale,
                    text: String::new(),
                }
            }
            (State::Base, Token::Close { start, end }) => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedClose,
                    start,
                    &input[start..end],
                ));
            }
            (State::Foreign { open_at, locale, mut text }, Token::Text(span)) => {
                text.push_str(span);
                State::Foreign {
                    open_at,
                    locale,
                    text,
                }
            }
            (State::Foreign { .. }, Token::Open { start, end, .. }) => {
                return Err(ParseError::new(
                    ParseErrorKind::NestedLang,
                    start,
                    &input[start..end],
                ));
            }
            (State::Foreign { locale, text, .. }, Token::Close { .. }) => {
                if !text.is_empty() {
                    blocks.push(LanguageBlock::new(
                        locale,
                        vec![Part::text_with_rate(text, options.foreign_rate.clone())],
                    ));
                }
                State::Base
            }
        };
    }

    if let State::Foreign { open_at, .. } = state {
        return Err(ParseError::new(
            ParseErrorKind::UnclosedLang,
            open_at,
            &input[open_at..],
        ));
    }

    if let Some(text) = base_text {
        blocks.push(LanguageBlock::new(
            options.base_locale.clone(),
            vec![Part::text(text)],
        ));
    }

    Ok(Transcript(blocks))
}
