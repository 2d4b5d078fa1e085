use rxcheck_core::config::{load_config, CatalogSource, SecondaryMode, TriageConfig};
use rxcheck_core::error::RxError;
use rxcheck_core::model::ParsedPrescription;
use rxcheck_core::parsing::parse_prescription;
use rxcheck_core::Triage;
use std::path::PathBuf;

use crate::output;

pub struct CheckArgs {
    pub input_file: PathBuf,
    pub catalog: Option<PathBuf>,
    pub preset: Option<String>,
    pub config: Option<PathBuf>,
    pub secondary: Option<String>,
    pub age: Option<u32>,
    pub output_format: String,
    pub verbose: bool,
}

pub fn run(args: CheckArgs) -> Result<(), RxError> {
    // Command-line flags override the config file.
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => TriageConfig::default(),
    };
    if let Some(path) = args.catalog {
        config.catalog = CatalogSource::File(path);
    } else if let Some(name) = args.preset {
        config.catalog = CatalogSource::Preset(name);
    }
    if let Some(mode) = args.secondary.as_deref() {
        config.secondary = SecondaryMode::from_str_loose(mode).unwrap_or_default();
    }

    let triage = Triage::from_config(&config)?;

    // Determine input type by extension
    let is_json = args
        .input_file
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let mut prescription = if is_json {
        let json_bytes = std::fs::read(&args.input_file)?;
        let value: serde_json::Value = serde_json::from_slice(&json_bytes)?;
        ParsedPrescription::from_json_value(&value)?
    } else {
        let text = std::fs::read_to_string(&args.input_file)?;
        parse_prescription(&text)
    };

    if let Some(age) = args.age {
        prescription.patient_age = Some(age);
    }
    if prescription.drugs.is_empty() {
        tracing::warn!(file = %args.input_file.display(), "no drugs found in input");
    }

    let result = triage.check_prescription(&prescription);

    match args.output_format.as_str() {
        "json" => output::json::print(&result)?,
        _ => output::table::print(&result, triage.catalog(), args.verbose),
    }

    Ok(())
}
