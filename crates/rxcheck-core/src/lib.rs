pub mod catalog;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod model;
pub mod parsing;
pub mod trace;

use catalog::RuleCatalog;
use config::{SecondaryMode, TriageConfig};
use error::RxError;
use evaluate::outcome::{CheckResult, RiskReport};
use evaluate::secondary::{MockClinicalRules, SecondaryAnalysis};
use model::{DrugEntry, ParsedPrescription, PatientContext};
use std::sync::Arc;

/// A loaded catalog plus the optional secondary analysis to merge in.
///
/// Cheap to clone and safe to share between threads; checks never mutate it.
#[derive(Clone)]
pub struct Triage {
    catalog: Arc<RuleCatalog>,
    secondary: Option<Arc<dyn SecondaryAnalysis>>,
}

impl Triage {
    pub fn new(catalog: RuleCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            secondary: None,
        }
    }

    pub fn with_secondary(mut self, secondary: Arc<dyn SecondaryAnalysis>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Build the catalog named by the config and select its secondary mode.
    pub fn from_config(config: &TriageConfig) -> Result<Self, RxError> {
        let catalog = catalog::load_source(&config.catalog)?;
        let triage = Triage::new(catalog);
        Ok(match config.secondary {
            SecondaryMode::Off => triage,
            SecondaryMode::Mock => triage.with_secondary(Arc::new(MockClinicalRules::default())),
        })
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn secondary_name(&self) -> Option<&str> {
        self.secondary.as_deref().map(|s| s.name())
    }

    /// Evaluate a drug list, merging in the secondary analysis if configured.
    pub fn check(&self, drugs: &[DrugEntry], patient: &PatientContext) -> RiskReport {
        let primary = evaluate::evaluate(&self.catalog, drugs, patient);
        let secondary = self.secondary.as_ref().map(|s| s.analyze(drugs, patient));
        let report = evaluate::merge(primary, secondary);

        tracing::info!(
            catalog = self.catalog.name(),
            drugs = drugs.len(),
            risk_score = report.risk_score,
            level = %report.interaction_risk,
            interactions = report.interactions.len(),
            "prescription checked"
        );
        report
    }

    pub fn check_prescription(&self, prescription: &ParsedPrescription) -> CheckResult {
        let report = self.check(&prescription.drugs, &prescription.patient());
        CheckResult {
            prescription: prescription.clone(),
            report,
            secondary: self.secondary_name().map(str::to_string),
        }
    }
}

impl std::fmt::Debug for Triage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Triage")
            .field("catalog", &self.catalog.name())
            .field("secondary", &self.secondary_name())
            .finish()
    }
}

/// Main API entry point: parse prescription text and check it.
pub fn check_text(text: &str, triage: &Triage) -> CheckResult {
    let prescription = parsing::parse_prescription(text);
    triage.check_prescription(&prescription)
}
