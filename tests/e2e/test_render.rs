use lessontape::domain::shared::ParseErrorKind;
use lessontape::domain::speech::split_markup;
use lessontape::domain::transcript::{
    parse_transcript, serialize, ParseOptions, TranscriptDialect,
};
use pretty_assertions::assert_eq;

const VOICE: &str = "en-US-RyanMultilingualNeural";

#[test]
fn it_should_render_the_same_lesson_from_every_dialect() {
    let options = ParseOptions::default();
    let inline = r#"Thank you is <lang lang="ja-JP">ありがとう</lang>."#;

    let from_inline = parse_transcript(inline, TranscriptDialect::Inline, &options).unwrap();
    let markup = serialize(&from_inline, VOICE);
    let from_markup = parse_transcript(&markup, TranscriptDialect::Markup, &options).unwrap();
    let as_json = serde_json::to_string(&from_inline).unwrap();
    let from_json = parse_transcript(&as_json, TranscriptDialect::Json, &options).unwrap();

    // Markup drops surrounding whitespace, so compare what gets spoken
    assert_eq!(serialize(&from_markup, VOICE), markup);
    assert_eq!(from_markup.len(), from_inline.len());
    assert_eq!(from_json, from_inline);
    assert_eq!(TranscriptDialect::detect(&markup), TranscriptDialect::Markup);
    assert_eq!(TranscriptDialect::detect(&as_json), TranscriptDialect::Json);
    assert_eq!(TranscriptDialect::detect(inline), TranscriptDialect::Inline);
}

#[test]
fn it_should_escape_markup_characters_in_spoken_text() {
    let options = ParseOptions::default();
    let transcript = parse_transcript(
        r#"Salt & pepper is <lang lang="fr-FR">sel & poivre</lang>."#,
        TranscriptDialect::Inline,
        &options,
    )
    .unwrap();

    let markup = serialize(&transcript, VOICE);

    assert!(markup.contains("Salt &amp; pepper is"));
    assert!(markup.contains("sel &amp; poivre"));
    let reread = parse_transcript(&markup, TranscriptDialect::Markup, &options).unwrap();
    assert_eq!(serialize(&reread, VOICE), markup);
    assert!(reread.spoken_text().contains("sel & poivre"));
}

#[test]
fn it_should_keep_chunks_within_the_voice_limit() {
    let options = ParseOptions::default();
    let inline: String = (0..30)
        .map(|i| format!(r#"Say {} as <lang lang="de-DE">{}</lang>. "#, i, i))
        .collect();
    let markup = serialize(
        &parse_transcript(&inline, TranscriptDialect::Inline, &options).unwrap(),
        VOICE,
    );

    let chunks = split_markup(&markup, 25).unwrap();

    assert_eq!(chunks.len(), 3);
    for chunk in &chunks {
        let transcript = parse_transcript(chunk, TranscriptDialect::Markup, &options).unwrap();
        assert!(transcript.len() <= 25);
    }
}

#[test]
fn it_should_report_where_a_transcript_is_broken() {
    let err = parse_transcript(
        r#"One <lang lang="ja-JP">ichi <lang lang="ja-JP">ni</lang></lang>"#,
        TranscriptDialect::Inline,
        &ParseOptions::default(),
    )
    .unwrap_err();

    assert_eq!(err.kind, ParseErrorKind::NestedLang);
    assert_eq!(err.offset, 28);
}
