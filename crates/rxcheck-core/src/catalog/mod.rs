pub mod builtin;
pub mod schema;

use crate::config::CatalogSource;
use crate::error::RxError;
use crate::model::RiskLevel;
use crate::parsing::normalize::normalize_drug_name;
use schema::{AgeSensitivityDef, CatalogDef};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

/// Load a catalog definition from a JSON file.
pub fn load_catalog(path: &Path) -> Result<CatalogDef, RxError> {
    let content = std::fs::read_to_string(path).map_err(|e| RxError::CatalogLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_catalog(&content, path)
}

/// Parse a catalog definition from a JSON string.
pub fn parse_catalog(json: &str, source: &Path) -> Result<CatalogDef, RxError> {
    let def: CatalogDef = serde_json::from_str(json).map_err(|e| RxError::CatalogLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_catalog(&def)?;
    Ok(def)
}

/// Parse a catalog definition from a JSON string (no file path context).
pub fn parse_catalog_str(json: &str) -> Result<CatalogDef, RxError> {
    let def: CatalogDef = serde_json::from_str(json).map_err(RxError::Json)?;
    validate_catalog(&def)?;
    Ok(def)
}

/// Resolve a configured catalog source into a ready-to-use catalog.
pub fn load_source(source: &CatalogSource) -> Result<RuleCatalog, RxError> {
    let def = match source {
        CatalogSource::Preset(name) => builtin::load_preset(name)?,
        CatalogSource::File(path) => load_catalog(path)?,
    };
    RuleCatalog::from_def(&def)
}

/// Validate that a catalog is well-formed.
pub fn validate_catalog(def: &CatalogDef) -> Result<(), RxError> {
    if def.name.trim().is_empty() {
        return Err(RxError::CatalogInvalid("name must not be empty".into()));
    }
    if def.version.trim().is_empty() {
        return Err(RxError::CatalogInvalid("version must not be empty".into()));
    }

    let mut seen_drugs = HashSet::new();
    for drug in &def.drugs {
        let key = normalize_drug_name(&drug.name);
        if key.is_empty() {
            return Err(RxError::CatalogInvalid("drug name must not be empty".into()));
        }
        if !seen_drugs.insert(key) {
            return Err(RxError::CatalogInvalid(format!(
                "drug '{}' is defined more than once",
                drug.name.trim()
            )));
        }
    }

    let mut seen_pairs = HashSet::new();
    for combo in &def.combos {
        let [a, b] = &combo.drugs;
        let (a, b) = (normalize_drug_name(a), normalize_drug_name(b));
        if a.is_empty() || b.is_empty() {
            return Err(RxError::CatalogInvalid("combination drug names must not be empty".into()));
        }
        if a == b {
            return Err(RxError::CatalogInvalid(format!(
                "combination '{}' pairs a drug with itself",
                a
            )));
        }
        if !seen_pairs.insert(pair_key(&a, &b)) {
            return Err(RxError::CatalogInvalid(format!(
                "combination '{} + {}' is defined more than once",
                a, b
            )));
        }
    }

    for (idx, rule) in def.age_rules.iter().enumerate() {
        if rule.message.trim().is_empty() {
            return Err(RxError::CatalogInvalid(format!(
                "age rule #{} has an empty message",
                idx + 1
            )));
        }
        match (rule.min_age, rule.max_age) {
            (None, None) => {
                return Err(RxError::CatalogInvalid(format!(
                    "age rule #{} ('{}') has neither min_age nor max_age",
                    idx + 1,
                    rule.message
                )));
            }
            (Some(min), Some(max)) if min > max => {
                return Err(RxError::CatalogInvalid(format!(
                    "age rule #{} ('{}') has min_age {} above max_age {}",
                    idx + 1,
                    rule.message,
                    min,
                    max
                )));
            }
            _ => {}
        }
        if rule.drugs.iter().any(|d| d.trim().is_empty()) {
            return Err(RxError::CatalogInvalid(format!(
                "age rule #{} ('{}') lists an empty drug name",
                idx + 1,
                rule.message
            )));
        }
    }

    for (idx, rule) in def.predicted_risks.iter().enumerate() {
        if rule.message.trim().is_empty() {
            return Err(RxError::CatalogInvalid(format!(
                "predicted risk #{} has an empty message",
                idx + 1
            )));
        }
        if rule.drugs.is_empty() || rule.drugs.iter().any(|d| d.trim().is_empty()) {
            return Err(RxError::CatalogInvalid(format!(
                "predicted risk #{} ('{}') needs at least one non-empty drug name",
                idx + 1,
                rule.message
            )));
        }
    }

    Ok(())
}

/// Order-independent key for a drug pair.
fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Flags and alternatives for one catalog drug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrugRule {
    pub flags: Vec<String>,
    pub alternatives: Vec<String>,
}

/// A high-risk combination, with names in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighRiskCombo {
    pub first: String,
    pub second: String,
    pub severity: RiskLevel,
}

/// An age-dependent rule with normalized drug names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeRule {
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub drugs: Vec<String>,
    pub message: String,
    pub points: u32,
}

impl AgeRule {
    /// True if `age` lies in the (inclusive) band and, when the rule names
    /// drugs, the patient takes at least one of them.
    pub fn applies(&self, age: u32, drugs: &HashSet<String>) -> bool {
        let in_band = self.min_age.map_or(true, |min| age >= min)
            && self.max_age.map_or(true, |max| age <= max);
        in_band && (self.drugs.is_empty() || self.drugs.iter().any(|d| drugs.contains(d)))
    }
}

/// An advisory raised for each listed drug present in a prescription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictedRiskRule {
    pub drugs: BTreeSet<String>,
    pub message: String,
}

impl PredictedRiskRule {
    pub fn covers(&self, normalized_name: &str) -> bool {
        self.drugs.contains(normalized_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeSensitivity {
    pub below: u32,
    pub above: u32,
    pub points: u32,
}

impl AgeSensitivity {
    pub fn applies(&self, age: u32) -> bool {
        age < self.below || age > self.above
    }
}

impl From<&AgeSensitivityDef> for AgeSensitivity {
    fn from(def: &AgeSensitivityDef) -> Self {
        Self {
            below: def.below,
            above: def.above,
            points: def.points,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scoring {
    pub drug_flag_points: u32,
    pub combo_points: u32,
    pub age_sensitivity: AgeSensitivity,
}

/// Read-only rule catalog with normalized keys.
///
/// Built once from a validated [`CatalogDef`] and never mutated afterwards,
/// so a single instance can back any number of concurrent evaluations.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    name: String,
    version: String,
    drugs: HashMap<String, DrugRule>,
    combos: Vec<HighRiskCombo>,
    combo_index: HashMap<(String, String), usize>,
    age_rules: Vec<AgeRule>,
    predicted_risks: Vec<PredictedRiskRule>,
    scoring: Scoring,
}

impl RuleCatalog {
    /// Validate and compile a catalog definition.
    pub fn from_def(def: &CatalogDef) -> Result<RuleCatalog, RxError> {
        validate_catalog(def)?;

        let drugs = def
            .drugs
            .iter()
            .map(|d| {
                (
                    normalize_drug_name(&d.name),
                    DrugRule {
                        flags: d.flags.clone(),
                        alternatives: d.alternatives.clone(),
                    },
                )
            })
            .collect();

        let mut combos = Vec::with_capacity(def.combos.len());
        let mut combo_index = HashMap::new();
        for (idx, c) in def.combos.iter().enumerate() {
            let first = normalize_drug_name(&c.drugs[0]);
            let second = normalize_drug_name(&c.drugs[1]);
            combo_index.insert(pair_key(&first, &second), idx);
            combos.push(HighRiskCombo {
                first,
                second,
                severity: c.severity,
            });
        }

        let age_rules = def
            .age_rules
            .iter()
            .map(|r| AgeRule {
                min_age: r.min_age,
                max_age: r.max_age,
                drugs: r.drugs.iter().map(|d| normalize_drug_name(d)).collect(),
                message: r.message.clone(),
                points: r.points,
            })
            .collect();

        let predicted_risks = def
            .predicted_risks
            .iter()
            .map(|r| PredictedRiskRule {
                drugs: r.drugs.iter().map(|d| normalize_drug_name(d)).collect(),
                message: r.message.clone(),
            })
            .collect();

        let catalog = RuleCatalog {
            name: def.name.clone(),
            version: def.version.clone(),
            drugs,
            combos,
            combo_index,
            age_rules,
            predicted_risks,
            scoring: Scoring {
                drug_flag_points: def.scoring.drug_flag_points,
                combo_points: def.scoring.combo_points,
                age_sensitivity: AgeSensitivity::from(&def.scoring.age_sensitivity),
            },
        };

        tracing::info!(
            catalog = %catalog.name,
            version = %catalog.version,
            drugs = catalog.drugs.len(),
            combos = catalog.combos.len(),
            age_rules = catalog.age_rules.len(),
            "rule catalog loaded"
        );

        Ok(catalog)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Look up a drug by name (trimmed, case-insensitive, exact).
    pub fn lookup_drug(&self, name: &str) -> Option<&DrugRule> {
        self.drugs.get(&normalize_drug_name(name))
    }

    /// Severity of the combination of two drugs, in either order.
    pub fn high_risk_combo(&self, a: &str, b: &str) -> Option<RiskLevel> {
        self.find_combo(&normalize_drug_name(a), &normalize_drug_name(b))
            .map(|(_, combo)| combo.severity)
    }

    /// Find a combination by already-normalized names, returning its
    /// position in catalog order.
    pub(crate) fn find_combo(&self, a: &str, b: &str) -> Option<(usize, &HighRiskCombo)> {
        if a == b {
            return None;
        }
        let idx = *self.combo_index.get(&pair_key(a, b))?;
        Some((idx, &self.combos[idx]))
    }

    pub(crate) fn drug_by_key(&self, normalized_name: &str) -> Option<&DrugRule> {
        self.drugs.get(normalized_name)
    }

    pub fn age_rules(&self) -> &[AgeRule] {
        &self.age_rules
    }

    pub fn predicted_risks(&self) -> &[PredictedRiskRule] {
        &self.predicted_risks
    }

    pub fn scoring(&self) -> &Scoring {
        &self.scoring
    }
}
