/// Normalize a drug name to its catalog key: trimmed and lowercased.
///
/// No alias expansion or fuzzy matching happens here; a name either matches
/// a catalog key exactly after this step or it is unknown.
pub fn normalize_drug_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Name for display: original casing, surrounding whitespace removed.
pub fn display_name(raw: &str) -> String {
    raw.trim().to_string()
}

/// Capitalize the first letter of every alphabetic run ("potassium supplement"
/// -> "Potassium Supplement").
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
