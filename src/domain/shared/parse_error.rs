use std::fmt;

/// Longest fragment of offending input carried in a [`ParseError`].
const MAX_FRAGMENT_CHARS: usize = 120;

/// Why a piece of oracle output could not be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// `<lang` with no closing `>`
    UnterminatedTag,
    /// Open tag without a locale attribute, or with an empty one
    MissingLocale,
    /// Locale attribute that is not shaped like a BCP-47 tag
    InvalidLocale,
    /// `<lang ...>` with no matching `</lang>`
    UnclosedLang,
    /// `<lang` inside a foreign span
    NestedLang,
    /// `</lang>` with no open tag
    UnexpectedClose,
    /// Text that does not decode into the expected data shape
    MalformedData,
    /// SSML with unbalanced or unknown elements
    MalformedMarkup,
    /// A block that carries no parts
    EmptyBlock,
    /// Nothing usable in the input
    EmptyTranscript,
    /// Lesson plan line structure not recognised
    MalformedPlan,
    /// Lesson title empty or colliding with another title
    InvalidTitle,
}

impl ParseErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::UnterminatedTag => "unterminated tag",
            ParseErrorKind::MissingLocale => "missing locale attribute",
            ParseErrorKind::InvalidLocale => "invalid locale",
            ParseErrorKind::UnclosedLang => "unclosed <lang> tag",
            ParseErrorKind::NestedLang => "nested <lang> tag",
            ParseErrorKind::UnexpectedClose => "</lang> without matching <lang>",
            ParseErrorKind::MalformedData => "malformed data",
            ParseErrorKind::MalformedMarkup => "malformed markup",
            ParseErrorKind::EmptyBlock => "block without parts",
            ParseErrorKind::EmptyTranscript => "empty transcript",
            ParseErrorKind::MalformedPlan => "malformed lesson plan",
            ParseErrorKind::InvalidTitle => "invalid lesson title",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured parse failure.
///
/// The `Display` output is what gets forwarded to the oracle as a repair hint,
/// so it names the problem, where it happened and the offending text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at byte {offset}{}{}", detail_suffix(.detail), fragment_suffix(.fragment))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub detail: Option<String>,
    /// Byte offset into the parsed input
    pub offset: usize,
    pub fragment: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, offset: usize, fragment: &str) -> Self {
        Self {
            kind,
            detail: None,
            offset,
            fragment: truncate_fragment(fragment),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_ref()
        .map(|detail| format!(" ({})", detail))
        .unwrap_or_default()
}

fn fragment_suffix(fragment: &str) -> String {
    if fragment.is_empty() {
        String::new()
    } else {
        format!(": {:?}", fragment)
    }
}

fn truncate_fragment(fragment: &str) -> String {
    match fragment.char_indices().nth(MAX_FRAGMENT_CHARS) {
        Some((end, _)) => format!("{}...", &fragment[..end]),
        None => fragment.to_string(),
    }
}
