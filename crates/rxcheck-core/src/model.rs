use crate::error::RxError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Three-level risk scale used for the overall interaction risk and for
/// combination severities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[default]
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Map a clamped risk score to a level.
    ///
    /// Bounds are exclusive: 30 is still Low and 70 is still Moderate.
    pub fn from_score(score: u32) -> RiskLevel {
        if score > 70 {
            RiskLevel::High
        } else if score > 30 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Moderate => write!(f, "Moderate"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// One medication mention from a prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugEntry {
    /// Name as written; matching is case-insensitive and trimmed.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

impl DrugEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dosage: None,
            frequency: None,
        }
    }

    pub fn with_dosage(mut self, dosage: impl Into<String>) -> Self {
        self.dosage = Some(dosage.into());
        self
    }

    pub fn with_frequency(mut self, frequency: impl Into<String>) -> Self {
        self.frequency = Some(frequency.into());
        self
    }

    /// True if the name is empty after trimming. Such entries are skipped.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
    }
}

/// Patient facts that affect evaluation. An unknown age disables the age
/// rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientContext {
    pub age: Option<u32>,
}

impl PatientContext {
    pub fn with_age(age: u32) -> Self {
        Self { age: Some(age) }
    }
}

/// A line of prescription text the parser could not turn into a drug entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLine {
    pub line_number: usize,
    pub text: String,
    pub reason: String,
}

/// Structured prescription: the parser's output and the evaluator's input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPrescription {
    #[serde(default)]
    pub patient_age: Option<u32>,
    #[serde(default)]
    pub drugs: Vec<DrugEntry>,
    #[serde(default)]
    pub raw_text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_lines: Vec<SkippedLine>,
}

impl ParsedPrescription {
    pub fn patient(&self) -> PatientContext {
        PatientContext {
            age: self.patient_age,
        }
    }

    /// Build a prescription from loosely-shaped JSON.
    ///
    /// The top level must be an object. Drug entries that are not objects or
    /// lack a non-empty string `name` are dropped; an age that is not a
    /// non-negative integer is treated as unknown.
    pub fn from_json_value(value: &Value) -> Result<Self, RxError> {
        let obj = value.as_object().ok_or_else(|| {
            RxError::ParseError("prescription JSON must be an object".into())
        })?;

        let patient_age = match obj.get("patient_age").or_else(|| obj.get("age")) {
            None | Some(Value::Null) => None,
            Some(v) => match v.as_u64().and_then(|a| u32::try_from(a).ok()) {
                Some(age) => Some(age),
                None => {
                    tracing::warn!(value = %v, "ignoring unusable patient age");
                    None
                }
            },
        };

        let mut drugs = Vec::new();
        if let Some(items) = obj.get("drugs").and_then(Value::as_array) {
            for (idx, item) in items.iter().enumerate() {
                match drug_from_value(item) {
                    Some(drug) => drugs.push(drug),
                    None => {
                        tracing::warn!(index = idx, "skipping drug entry without a usable name")
                    }
                }
            }
        }

        let raw_text = obj
            .get("raw_text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            patient_age,
            drugs,
            raw_text,
            skipped_lines: Vec::new(),
        })
    }
}

fn drug_from_value(item: &Value) -> Option<DrugEntry> {
    let obj = item.as_object()?;
    let name = obj.get("name")?.as_str()?;
    if name.trim().is_empty() {
        return None;
    }
    let optional = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    Some(DrugEntry {
        name: name.to_string(),
        dosage: optional("dosage"),
        frequency: optional("frequency"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_level_threshold_boundaries() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(30), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(31), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(70), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(71), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::High);
    }

    #[test]
    fn test_blank_name_detected() {
        assert!(DrugEntry::new("   ").is_blank());
        assert!(!DrugEntry::new(" Aspirin ").is_blank());
    }

    #[test]
    fn test_lenient_json_skips_bad_entries() {
        let value = json!({
            "patient_age": 70,
            "drugs": [
                { "name": "Aspirin", "dosage": "75mg", "frequency": "" },
                "warfarin",
                { "dosage": "5mg" },
                { "name": "  " },
                { "name": "Warfarin", "frequency": "OD" }
            ]
        });
        let p = ParsedPrescription::from_json_value(&value).unwrap();
        assert_eq!(p.patient_age, Some(70));
        assert_eq!(p.drugs.len(), 2);
        assert_eq!(p.drugs[0].dosage.as_deref(), Some("75mg"));
        assert_eq!(p.drugs[0].frequency, None);
        assert_eq!(p.drugs[1].frequency.as_deref(), Some("OD"));
    }

    #[test]
    fn test_patient_context_from_prescription() {
        let value = json!({ "age": 8, "drugs": [ { "name": "Aspirin" } ] });
        let p = ParsedPrescription::from_json_value(&value).unwrap();
        assert_eq!(p.patient(), PatientContext::with_age(8));
        assert_eq!(ParsedPrescription::default().patient(), PatientContext::default());
    }

    #[test]
    fn test_negative_age_is_unknown() {
        let value = json!({ "patient_age": -4, "drugs": [] });
        let p = ParsedPrescription::from_json_value(&value).unwrap();
        assert_eq!(p.patient_age, None);
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(ParsedPrescription::from_json_value(&json!([1, 2])).is_err());
    }
}
