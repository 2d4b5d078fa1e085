use crate::evaluate::outcome::RiskReport;
use crate::evaluate::MAX_SCORE;
use crate::model::{DrugEntry, PatientContext, RiskLevel};
use crate::parsing::normalize::{normalize_drug_name, title_case};
use std::collections::{BTreeSet, HashMap, HashSet};

/// An independent analysis whose report is merged into the primary one.
///
/// Implementations must be total: a failing backend should return an empty
/// report rather than an error so the primary result is never lost.
pub trait SecondaryAnalysis: Send + Sync {
    /// Short identifier used in logs and output.
    fn name(&self) -> &str;

    fn analyze(&self, drugs: &[DrugEntry], patient: &PatientContext) -> RiskReport;
}

struct RiskyPair {
    first: &'static str,
    second: &'static str,
    reason: &'static str,
}

struct AgeWarning {
    drug: &'static str,
    min_age: Option<u32>,
    max_age: Option<u32>,
    message: &'static str,
    points: u32,
}

impl AgeWarning {
    fn applies(&self, age: u32, name: &str) -> bool {
        name.contains(self.drug)
            && self.min_age.map_or(true, |min| age >= min)
            && self.max_age.map_or(true, |max| age <= max)
    }
}

const BASE_SCORE: u32 = 15;
const PAIR_POINTS: u32 = 45;
const HIGH_DOSE_POINTS: u32 = 10;

const MOCK_EXPLANATION: &str =
    "Generated locally by the built-in clinical mock rules; no external service was consulted.";

/// Small hardcoded knowledge base standing in for a remote clinical model.
///
/// Interactions are reported as flags only, never as `interactions` entries.
pub struct MockClinicalRules {
    pairs: Vec<RiskyPair>,
    alternatives: HashMap<&'static str, Vec<&'static str>>,
    age_warnings: Vec<AgeWarning>,
}

impl Default for MockClinicalRules {
    fn default() -> Self {
        let pairs = vec![
            RiskyPair {
                first: "ibuprofen",
                second: "warfarin",
                reason: "Bleeding risk (NSAID + anticoagulant)",
            },
            RiskyPair {
                first: "aspirin",
                second: "warfarin",
                reason: "Bleeding risk (antiplatelet + anticoagulant)",
            },
            RiskyPair {
                first: "clopidogrel",
                second: "omeprazole",
                reason: "Reduced clopidogrel activation (CYP2C19)",
            },
        ];

        let alternatives = HashMap::from([
            ("ibuprofen", vec!["paracetamol"]),
            ("aspirin", vec!["paracetamol"]),
            ("omeprazole", vec!["ranitidine (if appropriate)", "famotidine"]),
            (
                "warfarin",
                vec!["dabigatran (specialist advice)", "apixaban (specialist advice)"],
            ),
        ]);

        let age_warnings = vec![
            AgeWarning {
                drug: "ibuprofen",
                min_age: Some(65),
                max_age: None,
                message: "NSAIDs can increase GI bleeding risk in 65+.",
                points: 20,
            },
            AgeWarning {
                drug: "aspirin",
                min_age: None,
                max_age: Some(12),
                message: "Avoid aspirin in children due to Reye's syndrome risk.",
                points: 40,
            },
        ];

        Self {
            pairs,
            alternatives,
            age_warnings,
        }
    }
}

impl MockClinicalRules {
    fn pair_reason(&self, a: &str, b: &str) -> Option<&'static str> {
        self.pairs
            .iter()
            .find(|p| (p.first == a && p.second == b) || (p.first == b && p.second == a))
            .map(|p| p.reason)
    }

    fn add_alternatives(&self, name: &str, out: &mut BTreeSet<String>) {
        if let Some(alts) = self.alternatives.get(name) {
            out.extend(alts.iter().map(|a| a.to_string()));
        }
    }
}

impl SecondaryAnalysis for MockClinicalRules {
    fn name(&self) -> &str {
        "mock"
    }

    fn analyze(&self, drugs: &[DrugEntry], patient: &PatientContext) -> RiskReport {
        let mut seen = HashSet::new();
        let entries: Vec<(String, &DrugEntry)> = drugs
            .iter()
            .map(|d| (normalize_drug_name(&d.name), d))
            .filter(|(key, _)| !key.is_empty() && seen.insert(key.clone()))
            .collect();

        let mut flags = Vec::new();
        let mut alternatives = BTreeSet::new();
        let mut score = BASE_SCORE;

        for (i, (a, _)) in entries.iter().enumerate() {
            for (b, _) in &entries[i + 1..] {
                if let Some(reason) = self.pair_reason(a, b) {
                    flags.push(format!(
                        "Interaction: {} + {} → {}",
                        title_case(a),
                        title_case(b),
                        reason
                    ));
                    score = score.saturating_add(PAIR_POINTS);
                    self.add_alternatives(a, &mut alternatives);
                    self.add_alternatives(b, &mut alternatives);
                }
            }
        }

        if let Some(age) = patient.age {
            for (name, _) in &entries {
                for warning in &self.age_warnings {
                    if warning.applies(age, name) {
                        flags.push(format!(
                            "Age warning for {}: {}",
                            title_case(name),
                            warning.message
                        ));
                        score = score.saturating_add(warning.points);
                        self.add_alternatives(name, &mut alternatives);
                    }
                }
            }
        }

        for (name, drug) in &entries {
            let dose = drug
                .dosage
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
                .replace(' ', "");
            if name.contains("paracetamol") && (dose.contains("1000mg") || dose.contains("1g")) {
                flags.push(
                    "High single dose of Paracetamol detected; ensure total daily dose <= 4g."
                        .to_string(),
                );
                score = score.saturating_add(HIGH_DOSE_POINTS);
            }
        }

        let risk_score = score.min(MAX_SCORE);
        let interaction_risk = if risk_score >= 70 {
            RiskLevel::High
        } else if risk_score >= 40 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        };

        tracing::debug!(risk_score, %interaction_risk, "mock clinical analysis finished");

        RiskReport {
            risk_score,
            interaction_risk,
            flags,
            alternatives: alternatives.into_iter().collect(),
            interactions: Vec::new(),
            predicted_risks: Vec::new(),
            explanation: MOCK_EXPLANATION.to_string(),
            score_trace: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(names: &[&str], age: Option<u32>) -> RiskReport {
        let drugs: Vec<DrugEntry> = names.iter().map(|n| DrugEntry::new(*n)).collect();
        MockClinicalRules::default().analyze(&drugs, &PatientContext { age })
    }

    #[test]
    fn test_base_score_only() {
        let report = analyze(&["metformin"], Some(40));
        assert_eq!(report.risk_score, 15);
        assert_eq!(report.interaction_risk, RiskLevel::Low);
        assert!(report.flags.is_empty());
        assert!(report.interactions.is_empty());
    }

    #[test]
    fn test_risky_pair_flagged() {
        let report = analyze(&["Warfarin", "ibuprofen"], Some(40));
        assert_eq!(report.risk_score, 60);
        assert_eq!(report.interaction_risk, RiskLevel::Moderate);
        assert_eq!(
            report.flags,
            vec!["Interaction: Warfarin + Ibuprofen → Bleeding risk (NSAID + anticoagulant)"]
        );
        assert_eq!(
            report.alternatives,
            vec![
                "apixaban (specialist advice)",
                "dabigatran (specialist advice)",
                "paracetamol",
            ]
        );
        assert!(report.interactions.is_empty());
    }

    #[test]
    fn test_age_warnings() {
        let elderly = analyze(&["ibuprofen"], Some(65));
        assert_eq!(elderly.risk_score, 35);
        assert_eq!(
            elderly.flags,
            vec!["Age warning for Ibuprofen: NSAIDs can increase GI bleeding risk in 65+."]
        );

        let child = analyze(&["aspirin"], Some(12));
        assert_eq!(child.risk_score, 55);
        assert_eq!(child.alternatives, vec!["paracetamol"]);

        let unknown_age = analyze(&["aspirin"], None);
        assert_eq!(unknown_age.risk_score, 15);
    }

    #[test]
    fn test_high_paracetamol_dose() {
        let drugs = vec![DrugEntry::new("Paracetamol").with_dosage("1 G")];
        let report = MockClinicalRules::default().analyze(&drugs, &PatientContext::default());
        assert_eq!(report.risk_score, 25);
        assert_eq!(report.flags.len(), 1);

        let normal = vec![DrugEntry::new("Paracetamol").with_dosage("500mg")];
        let normal_report =
            MockClinicalRules::default().analyze(&normal, &PatientContext::default());
        assert_eq!(normal_report.risk_score, 15);
    }

    #[test]
    fn test_score_clamped_and_high() {
        let report = analyze(&["aspirin", "warfarin", "ibuprofen"], Some(70));
        // 15 + 45 + 45 + 20 = 125
        assert_eq!(report.risk_score, 100);
        assert_eq!(report.interaction_risk, RiskLevel::High);
    }

    #[test]
    fn test_mock_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockClinicalRules>();
    }
}
