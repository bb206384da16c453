//! Response parser: raw model text -> validated `AnalysisResult`.
//!
//! Two steps:
//! 1) `strip_code_fences` — the only heuristic, removes markdown fences around the payload
//! 2) `parse_object` — strict field-by-field validation of a JSON object

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::assessment::{AnalysisResult, PoliticalLeaning, Tone};
use crate::error::ParseError;

// ```json / ```JSON / ``` at the very start, ``` at the very end.
static OPEN_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A```[A-Za-z0-9_+\-]*[ \t]*\r?\n?").expect("open fence regex"));
static CLOSE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n?```\z").expect("close fence regex"));

pub const MAX_BIAS_SCORE: u64 = 100;

/// Parse the provider's raw text.
pub fn parse(raw: &str) -> Result<AnalysisResult, ParseError> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(&cleaned).map_err(|e| ParseError::Malformed(e.to_string()))?;
    match value {
        Value::Object(map) => parse_object(&map),
        other => Err(ParseError::Malformed(format!(
            "expected a JSON object, got {}",
            json_type(&other)
        ))),
    }
}

/// Remove a leading fence (with optional language tag) and a trailing fence.
pub fn strip_code_fences(raw: &str) -> String {
    let s = raw.trim().trim_start_matches('\u{feff}');
    let s = OPEN_FENCE.replace(s, "");
    let s = CLOSE_FENCE.replace(s.trim_end(), "");
    s.trim().to_string()
}

fn parse_object(map: &Map<String, Value>) -> Result<AnalysisResult, ParseError> {
    let political_leaning = PoliticalLeaning::from_label(required_str(map, "politicalLeaning")?);
    let bias_score = bias_score(map)?;
    let tone = Tone::from_label(required_str(map, "tone")?);

    Ok(AnalysisResult {
        political_leaning,
        bias_score,
        tone,
        framing_techniques: string_list(map, "framingTechniques")?,
        charged_words: string_list(map, "chargedWords")?,
        summary: optional_str(map, "summary")?,
        recommendation: optional_str(map, "recommendation")?,
    })
}

fn present<'a>(map: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    map.get(field).filter(|v| !v.is_null())
}

fn required_str<'a>(map: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, ParseError> {
    match present(map, field) {
        None => Err(ParseError::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(ParseError::Malformed(format!(
            "`{field}` must be a string, got {}",
            json_type(other)
        ))),
    }
}

fn bias_score(map: &Map<String, Value>) -> Result<u8, ParseError> {
    let v = present(map, "biasScore").ok_or(ParseError::MissingField("biasScore"))?;
    let n = match v {
        Value::Number(n) => n,
        other => return Err(ParseError::OutOfRange(other.to_string())),
    };
    let whole = if let Some(u) = n.as_u64() {
        Some(u)
    } else if let Some(f) = n.as_f64() {
        // 42.0 is still an integer; 42.5 and negatives are not in range.
        (f.fract() == 0.0 && f >= 0.0 && f <= MAX_BIAS_SCORE as f64).then_some(f as u64)
    } else {
        None
    };
    match whole {
        Some(u) if u <= MAX_BIAS_SCORE => Ok(u as u8),
        _ => Err(ParseError::OutOfRange(n.to_string())),
    }
}

fn string_list(map: &Map<String, Value>, field: &str) -> Result<Vec<String>, ParseError> {
    match present(map, field) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|it| match it {
                Value::String(s) => Ok(s.clone()),
                other => Err(ParseError::Malformed(format!(
                    "`{field}` items must be strings, got {}",
                    json_type(other)
                ))),
            })
            .collect(),
        Some(other) => Err(ParseError::Malformed(format!(
            "`{field}` must be a list, got {}",
            json_type(other)
        ))),
    }
}

fn optional_str(map: &Map<String, Value>, field: &str) -> Result<String, ParseError> {
    match present(map, field) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ParseError::Malformed(format!(
            "`{field}` must be a string, got {}",
            json_type(other)
        ))),
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tagged_and_bare_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  ```\n{}\n```  \n"), "{}");
        assert_eq!(strip_code_fences("```JSON {}```"), "{}");
        assert_eq!(strip_code_fences("{}"), "{}");
    }

    #[test]
    fn float_scores() {
        let ok = parse(r#"{"politicalLeaning":"Left","biasScore":42.0,"tone":"Emotional"}"#).unwrap();
        assert_eq!(ok.bias_score, 42);
        let err = parse(r#"{"politicalLeaning":"Left","biasScore":42.5,"tone":"Emotional"}"#);
        assert!(matches!(err, Err(ParseError::OutOfRange(_))));
        let neg = parse(r#"{"politicalLeaning":"Left","biasScore":-1,"tone":"Emotional"}"#);
        assert!(matches!(neg, Err(ParseError::OutOfRange(_))));
    }

    #[test]
    fn string_score_is_out_of_range_not_coerced() {
        let err = parse(r#"{"politicalLeaning":"Left","biasScore":"75","tone":"Emotional"}"#);
        assert!(matches!(err, Err(ParseError::OutOfRange(_))));
    }
}
