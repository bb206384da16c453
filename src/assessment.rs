//! assessment.rs — the structured bias assessment returned by the provider.
//!
//! Wire names are camelCase and serialized in the same order the prompt asks for.

use serde::{Serialize, Serializer};

/// Political leaning as reported by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoliticalLeaning {
    Left,
    CenterLeft,
    Center,
    CenterRight,
    Right,
    /// Any label the model invented; kept verbatim for display.
    Unrecognized(String),
}

impl PoliticalLeaning {
    /// Lenient label matching: "Center-Left", "center left" and "CenterLeft" are the same.
    pub fn from_label(label: &str) -> Self {
        match squash(label).as_str() {
            "left" => Self::Left,
            "centerleft" | "centreleft" => Self::CenterLeft,
            "center" | "centre" => Self::Center,
            "centerright" | "centreright" => Self::CenterRight,
            "right" => Self::Right,
            _ => Self::Unrecognized(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Left => "Left",
            Self::CenterLeft => "CenterLeft",
            Self::Center => "Center",
            Self::CenterRight => "CenterRight",
            Self::Right => "Right",
            Self::Unrecognized(s) => s,
        }
    }
}

/// Tone of the language used in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Emotional,
    Manipulative,
    Unrecognized(String),
}

impl Tone {
    pub fn from_label(label: &str) -> Self {
        match squash(label).as_str() {
            "neutral" => Self::Neutral,
            "emotional" => Self::Emotional,
            "manipulative" => Self::Manipulative,
            _ => Self::Unrecognized(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Neutral => "Neutral",
            Self::Emotional => "Emotional",
            Self::Manipulative => "Manipulative",
            Self::Unrecognized(s) => s,
        }
    }
}

fn squash(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl Serialize for PoliticalLeaning {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.label())
    }
}

impl Serialize for Tone {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.label())
    }
}

/// Validated result of one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub political_leaning: PoliticalLeaning,
    /// 0 = fully neutral, 100 = fully biased.
    pub bias_score: u8,
    pub tone: Tone,
    pub framing_techniques: Vec<String>,
    pub charged_words: Vec<String>,
    pub summary: String,
    pub recommendation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaning_labels_are_matched_leniently() {
        assert_eq!(PoliticalLeaning::from_label("Center-Left"), PoliticalLeaning::CenterLeft);
        assert_eq!(PoliticalLeaning::from_label(" center right "), PoliticalLeaning::CenterRight);
        assert_eq!(PoliticalLeaning::from_label("RIGHT"), PoliticalLeaning::Right);
        assert_eq!(
            PoliticalLeaning::from_label("Libertarian"),
            PoliticalLeaning::Unrecognized("Libertarian".into())
        );
    }

    #[test]
    fn serializes_in_prompt_order_with_camel_case_names() {
        let r = AnalysisResult {
            political_leaning: PoliticalLeaning::Center,
            bias_score: 10,
            tone: Tone::Neutral,
            framing_techniques: vec![],
            charged_words: vec!["slammed".into()],
            summary: "ok".into(),
            recommendation: "read more".into(),
        };
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(
            json,
            r#"{"politicalLeaning":"Center","biasScore":10,"tone":"Neutral","framingTechniques":[],"chargedWords":["slammed"],"summary":"ok","recommendation":"read more"}"#
        );
    }
}
