//! Presentation classes derived from an `AnalysisResult`. Pure functions, no I/O.

use serde::Serialize;

use crate::assessment::{AnalysisResult, PoliticalLeaning, Tone};

/// Three-way partition of the bias score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityBand {
    Low,
    Medium,
    High,
}

impl SeverityBand {
    pub fn color(self) -> &'static str {
        match self {
            SeverityBand::Low => "#22c55e",
            SeverityBand::Medium => "#f59e0b",
            SeverityBand::High => "#ef4444",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaningCategory {
    LeftAssociated,
    RightAssociated,
    Neutral,
}

impl LeaningCategory {
    pub fn color(self) -> &'static str {
        match self {
            LeaningCategory::LeftAssociated => "#3b82f6",
            LeaningCategory::RightAssociated => "#ef4444",
            LeaningCategory::Neutral => "#22c55e",
        }
    }
}

/// `<=30` Low, `31..=60` Medium, above that High.
pub fn severity_band(bias_score: u8) -> SeverityBand {
    match bias_score {
        0..=30 => SeverityBand::Low,
        31..=60 => SeverityBand::Medium,
        _ => SeverityBand::High,
    }
}

/// Only the outer poles get colored; CenterLeft/CenterRight stay neutral.
pub fn leaning_category(leaning: &PoliticalLeaning) -> LeaningCategory {
    match leaning {
        PoliticalLeaning::Left => LeaningCategory::LeftAssociated,
        PoliticalLeaning::Right => LeaningCategory::RightAssociated,
        _ => LeaningCategory::Neutral,
    }
}

pub fn tone_icon(tone: &Tone) -> &'static str {
    match tone {
        Tone::Neutral => "😐",
        Tone::Emotional => "😤",
        _ => "⚠️",
    }
}

/// Everything the UI needs to style a result card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub severity: SeverityBand,
    pub severity_color: &'static str,
    pub leaning: LeaningCategory,
    pub leaning_color: &'static str,
    pub tone_icon: &'static str,
}

impl Presentation {
    pub fn of(result: &AnalysisResult) -> Self {
        let severity = severity_band(result.bias_score);
        let leaning = leaning_category(&result.political_leaning);
        Self {
            severity,
            severity_color: severity.color(),
            leaning,
            leaning_color: leaning.color(),
            tone_icon: tone_icon(&result.tone),
        }
    }
}
