use rxcheck_core::catalog::RuleCatalog;
use rxcheck_core::evaluate::CheckResult;
use rxcheck_core::model::{ParsedPrescription, RiskLevel};

pub fn print(result: &CheckResult, catalog: &RuleCatalog, verbose: bool) {
    let report = &result.report;

    println!("=== {} (v{}) ===\n", catalog.name(), catalog.version());

    let banner = match report.interaction_risk {
        RiskLevel::High => "HIGH RISK prescription: immediate review required!",
        RiskLevel::Moderate => "Moderate risk: caution advised.",
        RiskLevel::Low => "Prescription appears safe.",
    };
    println!("  {banner}\n");

    let age = result
        .prescription
        .patient_age
        .map(|a| a.to_string())
        .unwrap_or_else(|| "unknown".into());
    println!(
        "  Risk score: {}/100  Level: {}  Patient age: {}",
        report.risk_score, report.interaction_risk, age
    );
    if let Some(ref name) = result.secondary {
        println!("  Secondary analysis: {name}");
    }
    println!();

    print_drugs(&result.prescription);

    println!("  Flags:");
    if report.flags.is_empty() {
        println!("    (none)");
    }
    for flag in &report.flags {
        println!("    - {flag}");
    }
    println!();

    println!("  Suggested alternatives:");
    if report.alternatives.is_empty() {
        println!("    (none needed)");
    }
    for alt in &report.alternatives {
        println!("    - {alt}");
    }
    println!();

    if !report.interactions.is_empty() {
        println!("  High-risk combinations:");
        for i in &report.interactions {
            println!("    {} + {}  -> {}", i.drug1, i.drug2, i.risk_level);
        }
        println!();
    }

    if !report.predicted_risks.is_empty() {
        println!("  Predicted risks:");
        for r in &report.predicted_risks {
            println!("    - {r}");
        }
        println!();
    }

    if verbose {
        println!("  Score breakdown:");
        for step in &report.score_trace {
            println!("    {:>+4}  {}", step.points, step.message);
        }
        println!("    ----");
        println!("    {:>4}  total", report.risk_score);
        println!();
        println!("  {}", report.explanation);
        println!();
    }
}

fn print_drugs(prescription: &ParsedPrescription) {
    if prescription.drugs.is_empty() {
        println!("  No drugs found.\n");
        return;
    }

    let max_name = prescription
        .drugs
        .iter()
        .map(|d| d.name.len())
        .max()
        .unwrap_or(10);

    println!("  Drugs:");
    for d in &prescription.drugs {
        println!(
            "    {:<width$}  {:<10}  {}",
            d.name,
            d.dosage.as_deref().unwrap_or("-"),
            d.frequency.as_deref().unwrap_or("-"),
            width = max_name
        );
    }
    println!();
}

/// Format a parsed prescription as human-readable text.
pub fn format_parsed(parsed: &ParsedPrescription) -> String {
    let mut lines = Vec::new();

    match parsed.patient_age {
        Some(age) => lines.push(format!("Patient age: {age}")),
        None => lines.push("Patient age: not found".to_string()),
    }
    lines.push(String::new());

    if parsed.drugs.is_empty() {
        lines.push("No drugs found.".to_string());
    } else {
        let max_name = parsed
            .drugs
            .iter()
            .map(|d| d.name.len())
            .max()
            .unwrap_or(10)
            .max(4);
        lines.push(format!(
            "  {:<width$}  {:<10}  Frequency",
            "Drug",
            "Dosage",
            width = max_name
        ));
        lines.push(format!("  {}", "-".repeat(max_name + 25)));
        for d in &parsed.drugs {
            lines.push(format!(
                "  {:<width$}  {:<10}  {}",
                d.name,
                d.dosage.as_deref().unwrap_or("-"),
                d.frequency.as_deref().unwrap_or("-"),
                width = max_name
            ));
        }
    }

    if !parsed.skipped_lines.is_empty() {
        lines.push(String::new());
        lines.push("Skipped lines:".to_string());
        for s in &parsed.skipped_lines {
            lines.push(format!("  line {}: {} ({})", s.line_number, s.text, s.reason));
        }
    }

    lines.join("\n")
}
