use crate::model::RiskLevel;
use serde::{Deserialize, Serialize};

/// A drug rule catalog as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    #[serde(default)]
    pub scoring: ScoringDef,
    #[serde(default)]
    pub drugs: Vec<DrugRuleDef>,
    #[serde(default)]
    pub combos: Vec<ComboDef>,
    #[serde(default)]
    pub age_rules: Vec<AgeRuleDef>,
    #[serde(default)]
    pub predicted_risks: Vec<PredictedRiskDef>,
}

/// Flags and safer alternatives for a single drug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugRuleDef {
    pub name: String,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// An unordered pair of drugs that is dangerous together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboDef {
    pub drugs: [String; 2],
    #[serde(default = "default_combo_severity")]
    pub severity: RiskLevel,
    #[serde(default)]
    pub note: Option<String>,
}

/// An age band, optionally narrowed to patients taking any of `drugs`.
///
/// Bounds are inclusive. An empty `drugs` list matches any drug set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeRuleDef {
    #[serde(default)]
    pub min_age: Option<u32>,
    #[serde(default)]
    pub max_age: Option<u32>,
    #[serde(default)]
    pub drugs: Vec<String>,
    pub message: String,
    pub points: u32,
}

/// A follow-up advisory attached to any of the listed drugs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictedRiskDef {
    pub drugs: Vec<String>,
    pub message: String,
}

/// Score increments applied by the evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringDef {
    /// Added once per drug that carries at least one flag.
    #[serde(default = "default_drug_flag_points")]
    pub drug_flag_points: u32,
    /// Added once per matched high-risk combination.
    #[serde(default = "default_combo_points")]
    pub combo_points: u32,
    #[serde(default)]
    pub age_sensitivity: AgeSensitivityDef,
}

impl Default for ScoringDef {
    fn default() -> Self {
        Self {
            drug_flag_points: default_drug_flag_points(),
            combo_points: default_combo_points(),
            age_sensitivity: AgeSensitivityDef::default(),
        }
    }
}

/// Flat increment for pediatric and elderly patients, regardless of drugs.
///
/// Applies when age < `below` or age > `above`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeSensitivityDef {
    #[serde(default = "default_sensitivity_below")]
    pub below: u32,
    #[serde(default = "default_sensitivity_above")]
    pub above: u32,
    #[serde(default = "default_sensitivity_points")]
    pub points: u32,
}

impl Default for AgeSensitivityDef {
    fn default() -> Self {
        Self {
            below: default_sensitivity_below(),
            above: default_sensitivity_above(),
            points: default_sensitivity_points(),
        }
    }
}

fn default_combo_severity() -> RiskLevel {
    RiskLevel::High
}

fn default_drug_flag_points() -> u32 {
    15
}

fn default_combo_points() -> u32 {
    40
}

fn default_sensitivity_below() -> u32 {
    12
}

fn default_sensitivity_above() -> u32 {
    65
}

fn default_sensitivity_points() -> u32 {
    10
}
