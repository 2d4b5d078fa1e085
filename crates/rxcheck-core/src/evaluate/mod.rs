pub mod engine;
pub mod merge;
pub mod outcome;
pub mod secondary;

pub use engine::{evaluate, EXPLANATION, MAX_SCORE};
pub use merge::merge;
pub use outcome::{CheckResult, Interaction, RiskReport};
pub use secondary::{MockClinicalRules, SecondaryAnalysis};

use std::collections::HashSet;

/// Drop repeated strings, keeping the first occurrence of each.
pub(crate) fn dedup_in_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
