// tests/parser.rs
//
// Response parser contract: fence tolerance, required fields, score range,
// optional lists.

use news_bias_detector::analyze::parser::parse;
use news_bias_detector::{ParseError, PoliticalLeaning, Tone};

const BARE: &str = r#"{"politicalLeaning":"CenterRight","biasScore":64,"tone":"Manipulative","framingTechniques":["loaded question","false balance"],"chargedWords":["radical","disaster"],"summary":"The piece leans right. It uses loaded language.","recommendation":"Check a second source."}"#;

#[test]
fn fenced_and_padded_json_parses_like_bare_json() {
    let bare = parse(BARE).expect("bare json");
    for wrapped in [
        format!("```json\n{BARE}\n```"),
        format!("\n\n  ```json\n{BARE}\n```  \n"),
        format!("```\n{BARE}\n```"),
        format!("```JSON{BARE}```"),
        format!("   {BARE}\t\n"),
    ] {
        assert_eq!(parse(&wrapped).expect("wrapped json"), bare, "input: {wrapped:?}");
    }

    assert_eq!(bare.political_leaning, PoliticalLeaning::CenterRight);
    assert_eq!(bare.bias_score, 64);
    assert_eq!(bare.tone, Tone::Manipulative);
    assert_eq!(bare.framing_techniques, vec!["loaded question", "false balance"]);
    assert_eq!(bare.charged_words, vec!["radical", "disaster"]);
}

#[test]
fn missing_bias_score_is_missing_field() {
    let raw = r#"{"politicalLeaning":"Left","tone":"Neutral"}"#;
    assert_eq!(parse(raw), Err(ParseError::MissingField("biasScore")));

    let null_score = r#"{"politicalLeaning":"Left","biasScore":null,"tone":"Neutral"}"#;
    assert_eq!(parse(null_score), Err(ParseError::MissingField("biasScore")));
}

#[test]
fn missing_leaning_or_tone_is_missing_field() {
    assert_eq!(
        parse(r#"{"biasScore":5,"tone":"Neutral"}"#),
        Err(ParseError::MissingField("politicalLeaning"))
    );
    assert_eq!(
        parse(r#"{"politicalLeaning":"Left","biasScore":5}"#),
        Err(ParseError::MissingField("tone"))
    );
}

#[test]
fn score_above_100_is_out_of_range() {
    let raw = r#"{"politicalLeaning":"Left","biasScore":150,"tone":"Neutral"}"#;
    assert_eq!(parse(raw), Err(ParseError::OutOfRange("150".into())));
}

#[test]
fn score_bounds_are_inclusive() {
    for score in [0, 100] {
        let raw = format!(r#"{{"politicalLeaning":"Left","biasScore":{score},"tone":"Neutral"}}"#);
        assert_eq!(parse(&raw).unwrap().bias_score, score);
    }
    let raw = r#"{"politicalLeaning":"Left","biasScore":101,"tone":"Neutral"}"#;
    assert!(matches!(parse(raw), Err(ParseError::OutOfRange(_))));
}

#[test]
fn garbage_is_malformed_not_a_panic() {
    for raw in [
        "",
        "Sorry, I can't help with that.",
        "```json\n{\"politicalLeaning\": \"Left\",\n```",
        "[1, 2, 3]",
        "42",
    ] {
        assert!(matches!(parse(raw), Err(ParseError::Malformed(_))), "input: {raw:?}");
    }
}

#[test]
fn wrong_types_are_malformed() {
    let raw = r#"{"politicalLeaning":"Left","biasScore":5,"tone":"Neutral","chargedWords":"radical"}"#;
    assert!(matches!(parse(raw), Err(ParseError::Malformed(_))));
    let raw = r#"{"politicalLeaning":7,"biasScore":5,"tone":"Neutral"}"#;
    assert!(matches!(parse(raw), Err(ParseError::Malformed(_))));
}

#[test]
fn optional_lists_and_texts_default_to_empty() {
    let r = parse(r#"{"politicalLeaning":"Right","biasScore":90,"tone":"Emotional"}"#).unwrap();
    assert!(r.framing_techniques.is_empty());
    assert!(r.charged_words.is_empty());
    assert!(r.summary.is_empty());
    assert!(r.recommendation.is_empty());

    let r = parse(r#"{"politicalLeaning":"Right","biasScore":90,"tone":"Emotional","chargedWords":null}"#).unwrap();
    assert!(r.charged_words.is_empty());
}

#[test]
fn unknown_labels_are_kept_not_rejected() {
    let r = parse(r#"{"politicalLeaning":"Populist","biasScore":70,"tone":"Sarcastic"}"#).unwrap();
    assert_eq!(r.political_leaning, PoliticalLeaning::Unrecognized("Populist".into()));
    assert_eq!(r.tone, Tone::Unrecognized("Sarcastic".into()));
}
