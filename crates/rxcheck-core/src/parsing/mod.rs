pub mod age;
pub mod normalize;

use crate::model::{DrugEntry, ParsedPrescription, SkippedLine};
use age::{mentions_age, parse_age};
use normalize::normalize_drug_name;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static DOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+\s?(?:mg|mcg|g|ml|units|IU))").unwrap());

static FREQ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d-\d-\d|\d\s?/\s?day|OD|BD|TID|QID|HS|PRN)\b").unwrap()
});

static CHUNK_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+-\s+|,|;|\s{2,}").unwrap());

const MAX_NAME_LEN: usize = 64;

/// Parse free prescription text (OCR, voice transcript or typed) into a
/// structured drug list and patient age.
///
/// Each non-empty line may carry one drug with an optional dosage and
/// frequency. Lines that cannot yield a drug name are reported in
/// `skipped_lines`. Repeated (name, dosage, frequency) triples are kept once.
pub fn parse_prescription(text: &str) -> ParsedPrescription {
    let patient_age = parse_age(text);
    let mut drugs = Vec::new();
    let mut skipped_lines = Vec::new();
    let mut seen = HashSet::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.chars().count() < 2 {
            continue;
        }

        match parse_drug_line(line) {
            Ok(drug) => {
                let key = (
                    normalize_drug_name(&drug.name),
                    drug.dosage.as_deref().unwrap_or_default().to_lowercase(),
                    drug.frequency.as_deref().unwrap_or_default().to_lowercase(),
                );
                if seen.insert(key) {
                    drugs.push(drug);
                }
            }
            Err(reason) => {
                tracing::debug!(line = idx + 1, %reason, "skipped prescription line");
                skipped_lines.push(SkippedLine {
                    line_number: idx + 1,
                    text: line.to_string(),
                    reason,
                });
            }
        }
    }

    ParsedPrescription {
        patient_age,
        drugs,
        raw_text: text.to_string(),
        skipped_lines,
    }
}

/// Try to read one drug entry from a single trimmed line.
fn parse_drug_line(line: &str) -> Result<DrugEntry, String> {
    let dose = DOSE_RE.find(line);
    let frequency = FREQ_RE
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    let candidate = match dose {
        Some(m) => {
            let before = line[..m.start()]
                .trim_matches(|c: char| matches!(c, ' ' | '-' | ':' | '\t' | '\u{2022}'));
            before
                .split(',')
                .next()
                .unwrap_or_default()
                .split('\u{2013}')
                .next()
                .unwrap_or_default()
                .trim()
        }
        None => {
            if mentions_age(line) {
                return Err("age statement".into());
            }
            CHUNK_SPLIT_RE.split(line).next().unwrap_or_default().trim()
        }
    };

    let name = sanitize_name(candidate);
    if !name.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(format!("no drug name found in '{}'", line));
    }

    let mut drug = DrugEntry::new(name);
    if let Some(m) = dose {
        drug = drug.with_dosage(m.as_str());
    }
    if let Some(f) = frequency {
        drug = drug.with_frequency(f);
    }
    Ok(drug)
}

/// Keep letters, digits, hyphens and spaces; cap the length.
fn sanitize_name(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == ' ')
        .take(MAX_NAME_LEN)
        .collect();
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_with_dose_and_frequency() {
        let d = parse_drug_line("Aspirin 75mg OD").unwrap();
        assert_eq!(d.name, "Aspirin");
        assert_eq!(d.dosage.as_deref(), Some("75mg"));
        assert_eq!(d.frequency.as_deref(), Some("OD"));
    }

    #[test]
    fn test_bullet_and_separator_stripped() {
        let d = parse_drug_line("\u{2022} Warfarin - 5 mg 1-0-1").unwrap();
        assert_eq!(d.name, "Warfarin");
        assert_eq!(d.dosage.as_deref(), Some("5 mg"));
        assert_eq!(d.frequency.as_deref(), Some("1-0-1"));
    }

    #[test]
    fn test_line_without_dose_uses_first_chunk() {
        let d = parse_drug_line("Paracetamol, as needed PRN").unwrap();
        assert_eq!(d.name, "Paracetamol");
        assert_eq!(d.dosage, None);
        assert_eq!(d.frequency.as_deref(), Some("PRN"));
    }

    #[test]
    fn test_multiword_name_kept() {
        let d = parse_drug_line("Potassium supplement 600 mg BD").unwrap();
        assert_eq!(d.name, "Potassium supplement");
    }

    #[test]
    fn test_name_sanitized() {
        let d = parse_drug_line("Metformin(XR)! 500mg").unwrap();
        assert_eq!(d.name, "MetforminXR");
    }

    #[test]
    fn test_age_line_skipped() {
        assert!(parse_drug_line("Patient age: 70").is_err());
    }

    #[test]
    fn test_numeric_only_line_skipped() {
        assert!(parse_drug_line("12/03/2024").is_err());
    }

    #[test]
    fn test_parse_prescription_end_to_end() {
        let text = "Patient age: 70\nAspirin 75mg OD\nWarfarin 5mg OD\n\naspirin 75mg od\n--";
        let p = parse_prescription(text);
        assert_eq!(p.patient_age, Some(70));
        assert_eq!(p.drugs.len(), 2);
        assert_eq!(p.drugs[0].name, "Aspirin");
        assert_eq!(p.drugs[1].name, "Warfarin");
        assert_eq!(p.skipped_lines.len(), 2);
        assert_eq!(p.skipped_lines[0].line_number, 1);
        assert_eq!(p.raw_text, text);
    }

    #[test]
    fn test_parse_prescription_empty_text() {
        let p = parse_prescription("");
        assert!(p.drugs.is_empty());
        assert_eq!(p.patient_age, None);
    }
}
