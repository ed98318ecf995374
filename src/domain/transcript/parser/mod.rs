//! Parsers from oracle output into a normalized [`Transcript`].
//!
//! Every dialect is a pure function of its input. Failures come back as
//! [`ParseError`] so the generation loop can hand the reason to the oracle.

mod inline;
mod markup;
mod structured;

use super::{
    Transcript, TranscriptDialect, DEFAULT_BASE_LOCALE, DEFAULT_FOREIGN_RATE, DEFAULT_PAUSE,
};
use crate::domain::shared::{ParseError, ParseErrorKind};
use regex::Regex;
use std::sync::LazyLock;

static LOCALE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z]{4})?(-([A-Za-z]{2}|[0-9]{3}))?$")
        .expect("locale pattern is valid")
});

static ATTRIBUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("attribute pattern is valid")
});

/// Conventions applied when turning inline-tagged text into blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub base_locale: String,
    pub pause: String,
    pub foreign_rate: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            base_locale: DEFAULT_BASE_LOCALE.to_string(),
            pause: DEFAULT_PAUSE.to_string(),
            foreign_rate: DEFAULT_FOREIGN_RATE.to_string(),
        }
    }
}

/// Parse raw oracle output written in `dialect`
pub fn parse_transcript(
    raw: &str,
    dialect: TranscriptDialect,
    options: &ParseOptions,
) -> Result<Transcript, ParseError> {
    match dialect {
        TranscriptDialect::Inline => inline::parse(raw, options),
        TranscriptDialect::Json => structured::parse(raw),
        TranscriptDialect::Markup => markup::parse(raw, options),
    }
}

/// Value of attribute `name` inside the body of a tag, quotes removed
pub(crate) fn attribute(tag_body: &str, name: &str) -> Option<String> {
    ATTRIBUTE_PATTERN
        .captures_iter(tag_body)
        .find(|caps| &caps[1] == name)
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)))
        .map(|value| value.as_str().to_string())
}

/// Check that `locale` is shaped like a BCP-47 language tag (`ja`, `ja-JP`, `zh-Hant-TW`)
pub(crate) fn validate_locale(locale: &str, offset: usize, fragment: &str) -> Result<(), ParseError> {
    if locale.trim().is_empty() {
        return Err(ParseError::new(ParseErrorKind::MissingLocale, offset, fragment));
    }
    if !LOCALE_PATTERN.is_match(locale) {
        return Err(ParseError::new(ParseErrorKind::InvalidLocale, offset, fragment)
            .with_detail(format!("{:?} is not a language tag like \"ja-JP\"", locale)));
    }
    Ok(())
}
