use crate::catalog::RuleCatalog;
use crate::evaluate::dedup_in_order;
use crate::evaluate::outcome::{Interaction, RiskReport};
use crate::model::{DrugEntry, PatientContext, RiskLevel};
use crate::parsing::normalize::{display_name, normalize_drug_name};
use crate::trace::{ScoreStepKind, ScoreTrace};
use std::collections::HashSet;

/// Upper bound of the risk score.
pub const MAX_SCORE: u32 = 100;

pub const EXPLANATION: &str = "Rule-based check of individual drug flags, high-risk \
combinations and age considerations against the loaded catalog. Demonstration data, \
not clinical advice.";

/// A distinct drug in the prescription.
struct Subject {
    key: String,
    display: String,
}

/// Evaluate a drug list for one patient against a catalog.
///
/// Never fails: blank names are skipped, unknown drugs contribute nothing and
/// a missing age only disables the age rules. Repeated names (after
/// normalization) count as one drug.
pub fn evaluate(
    catalog: &RuleCatalog,
    drugs: &[DrugEntry],
    patient: &PatientContext,
) -> RiskReport {
    let subjects = collect_subjects(drugs);
    let names: HashSet<String> = subjects.iter().map(|s| s.key.clone()).collect();
    let scoring = catalog.scoring();

    let mut trace = ScoreTrace::default();
    let mut flags = Vec::new();
    let mut alternatives = Vec::new();

    for subject in &subjects {
        let Some(rule) = catalog.drug_by_key(&subject.key) else {
            continue;
        };
        flags.extend(rule.flags.iter().cloned());
        alternatives.extend(rule.alternatives.iter().cloned());
        if !rule.flags.is_empty() {
            tracing::debug!(drug = %subject.display, "flagged drug");
            trace.add(
                ScoreStepKind::DrugFlag,
                scoring.drug_flag_points,
                format!("{}: {}", subject.display, rule.flags.join("; ")),
            );
        }
    }

    // Every distinct pair is tested; matches are reported in catalog order.
    let mut matched = Vec::new();
    for (i, a) in subjects.iter().enumerate() {
        for b in &subjects[i + 1..] {
            if let Some((idx, combo)) = catalog.find_combo(&a.key, &b.key) {
                let (first, second) = if combo.first == a.key { (a, b) } else { (b, a) };
                matched.push((idx, first, second, combo.severity));
            }
        }
    }
    matched.sort_by_key(|(idx, ..)| *idx);

    let mut interactions = Vec::with_capacity(matched.len());
    for (_, first, second, severity) in matched {
        tracing::debug!(
            drug1 = %first.display,
            drug2 = %second.display,
            %severity,
            "high-risk combination"
        );
        trace.add(
            ScoreStepKind::Combination,
            scoring.combo_points,
            format!("{} + {}: {} risk combination", first.display, second.display, severity),
        );
        interactions.push(Interaction {
            drug1: first.display.clone(),
            drug2: second.display.clone(),
            risk_level: severity,
        });
    }

    if let Some(age) = patient.age {
        for rule in catalog.age_rules() {
            if rule.applies(age, &names) {
                tracing::debug!(age, message = %rule.message, "age rule matched");
                flags.push(rule.message.clone());
                trace.add(
                    ScoreStepKind::AgeRule,
                    rule.points,
                    format!("Age {}: {}", age, rule.message),
                );
            }
        }

        let band = scoring.age_sensitivity;
        if band.applies(age) {
            trace.add(
                ScoreStepKind::AgeSensitivity,
                band.points,
                format!(
                    "Age {} is under {} or over {}: higher general sensitivity",
                    age, band.below, band.above
                ),
            );
        }
    }

    let mut predicted_risks = Vec::new();
    for rule in catalog.predicted_risks() {
        for subject in &subjects {
            if rule.covers(&subject.key) {
                predicted_risks.push(rule.message.clone());
            }
        }
    }

    let (risk_score, score_trace) = trace.finish(MAX_SCORE);
    let interaction_risk = RiskLevel::from_score(risk_score);

    tracing::debug!(
        drugs = subjects.len(),
        risk_score,
        %interaction_risk,
        "evaluation finished"
    );

    RiskReport {
        risk_score,
        interaction_risk,
        flags: dedup_in_order(flags),
        alternatives: dedup_in_order(alternatives),
        interactions,
        predicted_risks,
        explanation: EXPLANATION.to_string(),
        score_trace,
    }
}

/// Distinct, non-blank drugs in input order. The first spelling seen is
/// kept for display.
fn collect_subjects(drugs: &[DrugEntry]) -> Vec<Subject> {
    let mut seen = HashSet::new();
    let mut subjects = Vec::new();
    for (idx, drug) in drugs.iter().enumerate() {
        if drug.is_blank() {
            tracing::warn!(index = idx, "skipping drug entry with an empty name");
            continue;
        }
        let key = normalize_drug_name(&drug.name);
        if seen.insert(key.clone()) {
            subjects.push(Subject {
                key,
                display: display_name(&drug.name),
            });
        }
    }
    subjects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin::{demo_catalog, load_preset};
    use crate::catalog::parse_catalog_str;
    use crate::trace::ScoreStepKind;

    fn patient(age: Option<u32>) -> PatientContext {
        PatientContext { age }
    }

    fn drugs(names: &[&str]) -> Vec<DrugEntry> {
        names.iter().map(|n| DrugEntry::new(*n)).collect()
    }

    fn pair_set(report: &RiskReport) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = report
            .interactions
            .iter()
            .map(|i| {
                let (a, b) = (i.drug1.to_lowercase(), i.drug2.to_lowercase());
                if a <= b {
                    (a, b)
                } else {
                    (b, a)
                }
            })
            .collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn test_aspirin_warfarin_elderly() {
        let catalog = demo_catalog().unwrap();
        let report = evaluate(&catalog, &drugs(&["aspirin", "warfarin"]), &patient(Some(70)));

        assert_eq!(report.interactions.len(), 1);
        assert_eq!(report.interactions[0].risk_level, RiskLevel::High);
        assert_eq!(
            pair_set(&report),
            vec![("aspirin".to_string(), "warfarin".to_string())]
        );
        // 15 + 15 flags, 40 combination, 10 elderly
        assert_eq!(report.risk_score, 80);
        assert_eq!(report.interaction_risk, RiskLevel::High);
        assert!(report.flags.contains(&"May cause stomach bleeding".to_string()));
        assert!(report.alternatives.contains(&"Heparin".to_string()));
    }

    #[test]
    fn test_paracetamol_adult_is_clean() {
        let catalog = demo_catalog().unwrap();
        let report = evaluate(&catalog, &drugs(&["paracetamol"]), &patient(Some(30)));
        assert_eq!(report.risk_score, 0);
        assert_eq!(report.interaction_risk, RiskLevel::Low);
        assert!(report.flags.is_empty());
        assert!(report.alternatives.is_empty());
        assert!(report.interactions.is_empty());
        assert!(report.score_trace.is_empty());
    }

    #[test]
    fn test_metformin_without_age() {
        let catalog = demo_catalog().unwrap();
        let report = evaluate(&catalog, &drugs(&["metformin"]), &patient(None));
        assert_eq!(report.risk_score, 15);
        assert_eq!(report.interaction_risk, RiskLevel::Low);
        assert_eq!(report.flags, vec!["Monitor kidney function"]);
    }

    #[test]
    fn test_combination_symmetry() {
        let catalog = demo_catalog().unwrap();
        let forward = evaluate(
            &catalog,
            &drugs(&["aspirin", "ibuprofen", "warfarin"]),
            &patient(Some(40)),
        );
        let backward = evaluate(
            &catalog,
            &drugs(&["warfarin", "ibuprofen", "aspirin"]),
            &patient(Some(40)),
        );
        assert_eq!(forward.risk_score, backward.risk_score);
        assert_eq!(forward.interactions, backward.interactions);
        assert_eq!(pair_set(&forward).len(), 2);
    }

    #[test]
    fn test_deterministic() {
        let catalog = demo_catalog().unwrap();
        let list = drugs(&["Ciprofloxacin", "tizanidine", "Warfarin", "insulin"]);
        let a = evaluate(&catalog, &list, &patient(Some(8)));
        let b = evaluate(&catalog, &list, &patient(Some(8)));
        assert_eq!(a, b);
    }

    #[test]
    fn test_adding_known_drug_never_lowers_score() {
        let catalog = demo_catalog().unwrap();
        let def = load_preset("demo").unwrap();
        let bases: [&[&str]; 3] = [&[], &["paracetamol"], &["aspirin", "lisinopril"]];
        for base in bases {
            for age in [None, Some(5), Some(40), Some(80)] {
                let before = evaluate(&catalog, &drugs(base), &patient(age)).risk_score;
                for drug in &def.drugs {
                    let mut list = drugs(base);
                    list.push(DrugEntry::new(drug.name.clone()));
                    let after = evaluate(&catalog, &list, &patient(age)).risk_score;
                    assert!(
                        after >= before,
                        "adding {} to {:?} lowered score {} -> {}",
                        drug.name,
                        base,
                        before,
                        after
                    );
                }
            }
        }
    }

    #[test]
    fn test_score_clamped_at_100() {
        let catalog = demo_catalog().unwrap();
        let list = drugs(&[
            "aspirin",
            "ibuprofen",
            "warfarin",
            "naproxen",
            "ciprofloxacin",
            "tizanidine",
        ]);
        let report = evaluate(&catalog, &list, &patient(Some(80)));
        assert_eq!(report.risk_score, 100);
        assert_eq!(report.interaction_risk, RiskLevel::High);
        let last = report.score_trace.last().unwrap();
        assert_eq!(last.kind, ScoreStepKind::Clamp);
        let sum: i64 = report.score_trace.iter().map(|s| s.points).sum();
        assert_eq!(sum, 100);
    }

    #[test]
    fn test_unknown_drugs_only() {
        let catalog = demo_catalog().unwrap();
        let report = evaluate(&catalog, &drugs(&["foo", "Bar", "baz"]), &patient(Some(30)));
        assert_eq!(report.risk_score, 0);
        assert!(report.flags.is_empty());
        assert!(report.alternatives.is_empty());
        assert!(report.interactions.is_empty());
        assert!(report.predicted_risks.is_empty());
    }

    #[test]
    fn test_age_sensitivity_fires_once() {
        let catalog = demo_catalog().unwrap();
        let report = evaluate(&catalog, &drugs(&["foo", "bar", "baz", "qux"]), &patient(Some(5)));
        assert_eq!(report.risk_score, 10);
        let elderly = evaluate(&catalog, &drugs(&["foo", "bar"]), &patient(Some(90)));
        assert_eq!(elderly.risk_score, 10);
        let edge = evaluate(&catalog, &drugs(&["foo"]), &patient(Some(65)));
        assert_eq!(edge.risk_score, 0);
    }

    #[test]
    fn test_age_rule_adds_flag_and_points() {
        let catalog = demo_catalog().unwrap();
        let report = evaluate(&catalog, &drugs(&["Aspirin"]), &patient(Some(8)));
        // 15 flag + 40 pediatric aspirin rule + 10 sensitivity
        assert_eq!(report.risk_score, 65);
        assert_eq!(report.interaction_risk, RiskLevel::Moderate);
        assert!(report
            .flags
            .contains(&"Avoid aspirin in children due to Reye's syndrome risk.".to_string()));

        let adult = evaluate(&catalog, &drugs(&["Aspirin"]), &patient(Some(30)));
        assert_eq!(adult.risk_score, 15);
    }

    #[test]
    fn test_age_rules_skipped_without_age() {
        let catalog = demo_catalog().unwrap();
        let report = evaluate(&catalog, &drugs(&["ibuprofen"]), &patient(None));
        assert_eq!(report.risk_score, 15);
        assert_eq!(report.flags, vec!["May affect kidneys"]);
    }

    #[test]
    fn test_blank_names_skipped() {
        let catalog = demo_catalog().unwrap();
        let report = evaluate(&catalog, &drugs(&["", "   ", "metformin"]), &patient(None));
        assert_eq!(report.risk_score, 15);
    }

    #[test]
    fn test_duplicate_names_count_once() {
        let catalog = demo_catalog().unwrap();
        let report = evaluate(
            &catalog,
            &drugs(&["aspirin", " Aspirin ", "ASPIRIN"]),
            &patient(None),
        );
        assert_eq!(report.risk_score, 15);
        assert!(report.interactions.is_empty());
        assert_eq!(report.flags.len(), 1);
    }

    #[test]
    fn test_flags_deduplicated() {
        let catalog = demo_catalog().unwrap();
        let report = evaluate(
            &catalog,
            &drugs(&["azithromycin", "clarithromycin"]),
            &patient(None),
        );
        assert_eq!(report.flags, vec!["May prolong QT interval"]);
        assert_eq!(report.alternatives, vec!["Clarithromycin", "Azithromycin"]);
        // Exactly 30 is still Low.
        assert_eq!(report.risk_score, 30);
        assert_eq!(report.interaction_risk, RiskLevel::Low);
    }

    #[test]
    fn test_predicted_risk_order() {
        let catalog = demo_catalog().unwrap();
        let report = evaluate(
            &catalog,
            &drugs(&["tizanidine", "insulin", "prednisone"]),
            &patient(None),
        );
        assert_eq!(
            report.predicted_risks,
            vec![
                "Monitor blood sugar for next 1-2 weeks",
                "Monitor blood sugar for next 1-2 weeks",
                "May cause muscle weakness or dizziness",
            ]
        );
    }

    #[test]
    fn test_interaction_labels_use_input_spelling() {
        let catalog = demo_catalog().unwrap();
        let report = evaluate(&catalog, &drugs(&["  ASPIRIN", "Warfarin "]), &patient(None));
        assert_eq!(report.interactions.len(), 1);
        // Demo catalog lists this pair as (warfarin, aspirin).
        assert_eq!(report.interactions[0].drug1, "Warfarin");
        assert_eq!(report.interactions[0].drug2, "ASPIRIN");
    }

    #[test]
    fn test_interactions_follow_catalog_order() {
        let catalog = demo_catalog().unwrap();
        let report = evaluate(
            &catalog,
            &drugs(&["naproxen", "ibuprofen", "warfarin", "aspirin"]),
            &patient(None),
        );
        let labels: Vec<(&str, &str)> = report
            .interactions
            .iter()
            .map(|i| (i.drug1.as_str(), i.drug2.as_str()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("aspirin", "ibuprofen"),
                ("warfarin", "naproxen"),
                ("warfarin", "aspirin"),
            ]
        );
    }

    #[test]
    fn test_unknown_combination_partner() {
        let catalog = demo_catalog().unwrap();
        let report = evaluate(&catalog, &drugs(&["gemfibrozil", "atorvastatin"]), &patient(None));
        assert_eq!(report.interactions.len(), 1);
        // 15 for atorvastatin's flag, 40 for the combination
        assert_eq!(report.risk_score, 55);
    }

    #[test]
    fn test_custom_scoring_respected() {
        let def = parse_catalog_str(
            r#"{
                "name": "Custom", "version": "1",
                "scoring": { "drug_flag_points": 5, "combo_points": 50,
                             "age_sensitivity": { "below": 2, "above": 90, "points": 1 } },
                "drugs": [ { "name": "a", "flags": ["x"] }, { "name": "b", "flags": ["y"] } ],
                "combos": [ { "drugs": ["a", "b"], "severity": "Moderate" } ]
            }"#,
        )
        .unwrap();
        let catalog = RuleCatalog::from_def(&def).unwrap();
        let report = evaluate(&catalog, &drugs(&["A", "B"]), &patient(Some(95)));
        assert_eq!(report.risk_score, 61);
        assert_eq!(report.interactions[0].risk_level, RiskLevel::Moderate);
    }
}
