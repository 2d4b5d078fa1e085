use crate::model::{ParsedPrescription, RiskLevel};
use crate::trace::ScoreStep;
use serde::{Deserialize, Serialize};

/// A matched high-risk combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Display name of the first drug, in catalog order.
    pub drug1: String,
    /// Display name of the second drug.
    pub drug2: String,
    pub risk_level: RiskLevel,
}

/// Complete result of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskReport {
    /// Score in 0..=100.
    #[serde(default)]
    pub risk_score: u32,
    /// Derived from `risk_score` only.
    #[serde(default)]
    pub interaction_risk: RiskLevel,
    /// Deduplicated warnings, first occurrence order.
    #[serde(default)]
    pub flags: Vec<String>,
    /// Deduplicated safer-drug suggestions, first occurrence order.
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    #[serde(default)]
    pub predicted_risks: Vec<String>,
    #[serde(default)]
    pub explanation: String,
    /// How the score was built up.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub score_trace: Vec<ScoreStep>,
}

/// A parsed prescription together with its merged risk report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub prescription: ParsedPrescription,
    pub report: RiskReport,
    /// Name of the secondary analysis merged into `report`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
}
