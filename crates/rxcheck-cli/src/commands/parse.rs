use rxcheck_core::parsing::parse_prescription;
use std::path::PathBuf;

use crate::output;

pub fn run(
    input_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), rxcheck_core::error::RxError> {
    let text = std::fs::read_to_string(&input_file)?;
    let parsed = parse_prescription(&text);

    let output_str = match output_format {
        "json" => serde_json::to_string_pretty(&parsed)?,
        _ => output::table::format_parsed(&parsed),
    };

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&parsed)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Parsed {} drug(s), written to {}",
                parsed.drugs.len(),
                path.display()
            );
            if parsed.patient_age.is_none() {
                eprintln!("  warning: no patient age found; age rules will be skipped");
            }
            if !parsed.skipped_lines.is_empty() {
                eprintln!(
                    "  {} line(s) skipped during parsing",
                    parsed.skipped_lines.len()
                );
            }
        }
        None => {
            println!("{output_str}");
        }
    }

    Ok(())
}
