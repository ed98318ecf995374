pub mod parser;
pub mod service;
pub mod ssml;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use parser::{parse_transcript, ParseOptions};
pub use service::TranscriptService;
pub use ssml::{serialize, serialize_with_locale};

/// Locale used for untagged (base language) text
pub const DEFAULT_BASE_LOCALE: &str = "en-US";
/// Pause placed around base-language text that introduces a foreign span
pub const DEFAULT_PAUSE: &str = "1s";
/// Foreign material is introduced slowly
pub const DEFAULT_FOREIGN_RATE: &str = "-20%";

/// Locales the speech engine can pronounce with a multilingual voice
pub const SUPPORTED_LOCALES: &[&str] = &[
    "ar-EG", "ar-SA", "ca-ES", "cs-CZ", "da-DK", "de-AT", "de-CH", "de-DE", "en-AU", "en-CA",
    "en-GB", "en-HK", "en-IE", "en-IN", "en-US", "es-ES", "es-MX", "fi-FI", "fr-BE", "fr-CA",
    "fr-CH", "fr-FR", "hi-IN", "hu-HU", "id-ID", "it-IT", "ja-JP", "ko-KR", "nb-NO", "nl-BE",
    "nl-NL", "pl-PL", "pt-BR", "pt-PT", "ru-RU", "sv-SE", "th-TH", "tr-TR", "zh-CN", "zh-HK",
    "zh-TW",
];

/// One piece of spoken content inside a [`LanguageBlock`].
///
/// The JSON shape follows what the oracle is asked to produce:
/// `{"text": "...", "rate": "-20%"}` or `{"break": "1s"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, try_from = "RawPart")]
pub enum Part {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rate: Option<String>,
    },
    Pause {
        #[serde(rename = "break")]
        duration: String,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            rate: None,
        }
    }

    pub fn text_with_rate(text: impl Into<String>, rate: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            rate: Some(rate.into()),
        }
    }

    pub fn pause(duration: impl Into<String>) -> Self {
        Part::Pause {
            duration: duration.into(),
        }
    }
}

/// Wire form of a [`Part`] before deciding which kind it is
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPart {
    text: Option<String>,
    rate: Option<String>,
    #[serde(rename = "break")]
    duration: Option<String>,
}

impl TryFrom<RawPart> for Part {
    type Error = String;

    fn try_from(raw: RawPart) -> Result<Self, Self::Error> {
        match (raw.text, raw.duration) {
            (Some(text), None) => Ok(Part::Text {
                text,
                rate: raw.rate,
            }),
            (None, Some(duration)) if raw.rate.is_none() => Ok(Part::Pause { duration }),
            (None, Some(_)) => Err("a break part cannot carry a rate".to_string()),
            (Some(_), Some(_)) => Err("a part has either \"text\" or \"break\", not both".to_string()),
            (None, None) => Err("a part needs \"text\" or \"break\"".to_string()),
        }
    }
}

/// Contiguous content spoken in a single locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageBlock {
    pub lang: String,
    pub parts: Vec<Part>,
}

impl LanguageBlock {
    pub fn new(lang: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            lang: lang.into(),
            parts,
        }
    }
}

/// Normalized transcript: the canonical form every dialect parses into
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(pub Vec<LanguageBlock>);

impl Transcript {
    pub fn blocks(&self) -> &[LanguageBlock] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All text parts concatenated in order, pauses ignored
    pub fn spoken_text(&self) -> String {
        self.0
            .iter()
            .flat_map(|block| block.parts.iter())
            .filter_map(|part| match part {
                Part::Text { text, .. } => Some(text.as_str()),
                Part::Pause { .. } => None,
            })
            .collect()
    }
}

/// Source conventions the oracle output may follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptDialect {
    /// Plain text with `<lang lang="..">..</lang>` spans
    Inline,
    /// JSON list of `{lang, parts}` blocks
    Json,
    /// A speech markup document
    Markup,
}

impl TranscriptDialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptDialect::Inline => "inline",
            TranscriptDialect::Json => "json",
            TranscriptDialect::Markup => "markup",
        }
    }

    /// Guess the dialect of a stored or user supplied transcript
    pub fn detect(raw: &str) -> Self {
        let trimmed = raw.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') || trimmed.starts_with("```") {
            TranscriptDialect::Json
        } else if trimmed.starts_with("<speak") || trimmed.starts_with("<?xml") {
            TranscriptDialect::Markup
        } else {
            TranscriptDialect::Inline
        }
    }
}

impl FromStr for TranscriptDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inline" => Ok(TranscriptDialect::Inline),
            "json" => Ok(TranscriptDialect::Json),
            "markup" | "ssml" => Ok(TranscriptDialect::Markup),
            other => Err(format!("unknown transcript dialect: {}", other)),
        }
    }
}

impl std::fmt::Display for TranscriptDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
