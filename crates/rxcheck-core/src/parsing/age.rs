use regex::Regex;
use std::sync::LazyLock;

static AGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\bage\s*[:\-]?\s*(\d{1,3})\b|\b(\d{1,3})\s*(?:y/o|years|yrs|yo)\b)")
        .unwrap()
});

/// Find the patient age in free text.
///
/// Recognizes "Age: 70", "age - 8", "70 years", "8 y/o", "45yrs". Only the
/// first age-like mention is considered, and it must lie in 1..=119. A
/// duration such as "for 5 years" is not an age.
pub fn parse_age(text: &str) -> Option<u32> {
    let digits = age_mentions(text).next()?;
    let age: u32 = digits.parse().ok()?;
    (age > 0 && age < 120).then_some(age)
}

/// True if the line is an age statement and nothing else worth parsing.
pub(crate) fn mentions_age(line: &str) -> bool {
    age_mentions(line).next().is_some()
}

/// Digits of every age-like mention, in text order.
fn age_mentions(text: &str) -> impl Iterator<Item = &str> {
    AGE_RE.captures_iter(text).filter_map(move |caps| {
        if let Some(labelled) = caps.get(1) {
            return Some(labelled.as_str());
        }
        let bare = caps.get(2)?;
        let preceding = text[..bare.start()].trim_end();
        let last_word = preceding.rsplit(char::is_whitespace).next().unwrap_or_default();
        (!last_word.eq_ignore_ascii_case("for")).then_some(bare.as_str())
    })
}
