use rxcheck_core::catalog::builtin;
use rxcheck_core::catalog::schema::{CatalogDef, DrugRuleDef};
use rxcheck_core::catalog::RuleCatalog;
use rxcheck_core::error::RxError;
use rxcheck_core::parsing::normalize::normalize_drug_name;
use std::collections::HashSet;
use std::path::Path;

pub fn list() -> Result<(), RxError> {
    println!("Available embedded catalogs:\n");
    for name in builtin::PRESETS {
        let def = builtin::load_preset(name)?;
        println!(
            "  {:<8} {} (v{}) [{} drugs, {} combinations]",
            name,
            def.name,
            def.version,
            def.drugs.len(),
            def.combos.len()
        );
        if let Some(ref desc) = def.description {
            println!("           {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn explain(preset: &str) -> Result<(), RxError> {
    let def = builtin::load_preset(preset)?;

    println!("{} (version {})\n", def.name, def.version);
    if let Some(ref desc) = def.description {
        println!("{}\n", desc);
    }

    let scoring = &def.scoring;
    println!("Scoring:");
    println!(
        "  +{} for each drug with at least one flag",
        scoring.drug_flag_points
    );
    println!(
        "  +{} for each high-risk combination",
        scoring.combo_points
    );
    println!(
        "  +{} once if the patient is under {} or over {}",
        scoring.age_sensitivity.points,
        scoring.age_sensitivity.below,
        scoring.age_sensitivity.above
    );
    println!("  Score is capped at 100. Above 70 is High, above 30 is Moderate.\n");

    println!("Drugs:");
    println!();
    let max_name_len = def.drugs.iter().map(|d| d.name.len()).max().unwrap_or(20);
    println!(
        "  {:<width$}  {:<40}  Alternatives",
        "Drug",
        "Flags",
        width = max_name_len
    );
    println!("  {}", "-".repeat(max_name_len + 56));
    for drug in &def.drugs {
        println!("{}", drug_row(drug, max_name_len));
    }
    println!();

    if !def.combos.is_empty() {
        println!("High-risk combinations:");
        for combo in &def.combos {
            print!("  {} + {} ({})", combo.drugs[0], combo.drugs[1], combo.severity);
            match combo.note {
                Some(ref note) => println!(" -- {}", note),
                None => println!(),
            }
        }
        println!();
    }

    if !def.age_rules.is_empty() {
        println!("Age rules:");
        for rule in &def.age_rules {
            let band = match (rule.min_age, rule.max_age) {
                (Some(min), Some(max)) => format!("age {}-{}", min, max),
                (Some(min), None) => format!("age {}+", min),
                (None, Some(max)) => format!("age <= {}", max),
                (None, None) => "any age".to_string(),
            };
            let drugs = if rule.drugs.is_empty() {
                "any drug".to_string()
            } else {
                rule.drugs.join(", ")
            };
            println!("  {} with {}: {} (+{})", band, drugs, rule.message, rule.points);
        }
        println!();
    }

    if !def.predicted_risks.is_empty() {
        println!("Predicted risks:");
        for rule in &def.predicted_risks {
            println!("  {}: {}", rule.drugs.join(", "), rule.message);
        }
        println!();
    }

    Ok(())
}

/// One line of the drug table, with the drug's note (if any) appended.
fn drug_row(drug: &DrugRuleDef, name_width: usize) -> String {
    let flags = if drug.flags.is_empty() {
        "-".to_string()
    } else {
        drug.flags.join("; ")
    };
    let alts = if drug.alternatives.is_empty() {
        "-".to_string()
    } else {
        drug.alternatives.join(", ")
    };
    let mut row = format!(
        "  {:<width$}  {:<40}  {}",
        drug.name,
        flags,
        alts,
        width = name_width
    );
    if let Some(ref note) = drug.note {
        row.push_str(&format!(" -- {}", note));
    }
    row
}

pub fn schema() -> Result<(), RxError> {
    print!(
        r#"JSON Catalog Schema
===================

A catalog file defines per-drug warnings, dangerous drug pairs and
age-dependent rules. When you run `rxcheck check`, every drug in the
prescription is looked up by name (trimmed, case-insensitive, exact).

Top-level fields:
  name          (string, required)  Human-readable name of the catalog
  description   (string, optional)  What this catalog is for
  version       (string, required)  Version identifier (e.g., "2024.1")
  scoring       (object, optional)  Point values (see below)
  drugs         (array, optional)   Per-drug flags and alternatives
  combos        (array, optional)   High-risk drug pairs
  age_rules     (array, optional)   Age-dependent warnings
  predicted_risks
                (array, optional)   Follow-up advisories per drug

scoring:
  drug_flag_points  (integer, default 15)  Added per drug with a flag
  combo_points      (integer, default 40)  Added per matched combination
  age_sensitivity   (object)  {{ "below": 12, "above": 65, "points": 10 }}
                              Added once when age < below or age > above

Each entry in "drugs":
  name          (string, required)  Drug name; must be unique (case-insensitive)
  flags         (array of strings)  Warnings shown when the drug is present
  alternatives  (array of strings)  Safer options to suggest
  note          (string, optional)  Free-text reference

Each entry in "combos":
  drugs         (array of 2 strings, required)  Unordered pair; the drugs need
                                                not be listed under "drugs"
  severity      (string, optional)  "Low", "Moderate" or "High" (default)
  note          (string, optional)

Each entry in "age_rules":
  min_age, max_age  (integer, at least one required)  Inclusive bounds
  drugs         (array of strings)  Rule applies if any is present;
                                    empty means any prescription
  message       (string, required)  Added to the flags
  points        (integer, required) Added to the score

Each entry in "predicted_risks":
  drugs         (array of strings, required)
  message       (string, required)  Reported once per listed drug present

Example:
{{
  "name": "Ward catalog",
  "version": "1.0",
  "drugs": [
    {{ "name": "Digoxin", "flags": ["Narrow therapeutic index"], "alternatives": [] }},
    {{ "name": "Amiodarone", "flags": ["Thyroid effects"] }}
  ],
  "combos": [
    {{ "drugs": ["digoxin", "amiodarone"], "severity": "High",
      "note": "Amiodarone raises digoxin levels" }}
  ],
  "age_rules": [
    {{ "min_age": 80, "drugs": ["digoxin"],
      "message": "Reduce digoxin dose in 80+.", "points": 5 }}
  ]
}}
"#
    );
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), RxError> {
    let def = rxcheck_core::catalog::load_catalog(file)?;
    RuleCatalog::from_def(&def)?;

    println!("Catalog '{}' (v{}) is valid.", def.name, def.version);
    println!("  Drugs: {}", def.drugs.len());
    println!("  Combinations: {}", def.combos.len());
    println!("  Age rules: {}", def.age_rules.len());
    println!("  Predicted risks: {}", def.predicted_risks.len());

    let warnings = collect_warnings(&def);
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}

/// Potential issues that are not errors.
fn collect_warnings(def: &CatalogDef) -> Vec<String> {
    let known: HashSet<String> = def
        .drugs
        .iter()
        .map(|d| normalize_drug_name(&d.name))
        .collect();

    let mut warnings = Vec::new();
    for drug in &def.drugs {
        if !drug.flags.is_empty() && drug.alternatives.is_empty() {
            warnings.push(format!("drug '{}' has flags but no alternatives", drug.name));
        }
    }
    for combo in &def.combos {
        for name in &combo.drugs {
            if !known.contains(&normalize_drug_name(name)) {
                warnings.push(format!(
                    "combination '{} + {}' names '{}', which has no drug entry",
                    combo.drugs[0], combo.drugs[1], name
                ));
            }
        }
    }
    for rule in &def.age_rules {
        for name in &rule.drugs {
            if !known.contains(&normalize_drug_name(name)) {
                warnings.push(format!(
                    "age rule '{}' names '{}', which has no drug entry",
                    rule.message, name
                ));
            }
        }
    }
    warnings
}
