use crate::evaluate::dedup_in_order;
use crate::evaluate::outcome::RiskReport;

/// Fold an optional secondary report into the primary one.
///
/// Score, level, explanation and trace always come from `primary`. Flags and
/// alternatives are unioned with primary entries first; interactions and
/// predicted risks are appended after the primary's.
pub fn merge(primary: RiskReport, secondary: Option<RiskReport>) -> RiskReport {
    let Some(secondary) = secondary else {
        return primary;
    };

    let mut merged = primary;
    merged.flags.extend(secondary.flags);
    merged.flags = dedup_in_order(merged.flags);
    merged.alternatives.extend(secondary.alternatives);
    merged.alternatives = dedup_in_order(merged.alternatives);
    merged.interactions.extend(secondary.interactions);
    merged.predicted_risks.extend(secondary.predicted_risks);
    merged
}
