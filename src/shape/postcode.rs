use std::sync::LazyLock;

use regex::Regex;

/// Accepted postcode spellings, tried in order. The first capture group is the
/// five digit code kept in the document. ASCII digits only.
static POSTCODE_FORMATS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"^([0-9]{5})-[0-9]{4}$").expect("valid regex"),
        Regex::new(r"^CA ([0-9]{5})$").expect("valid regex"),
        Regex::new(r"^CA([0-9]{5})$").expect("valid regex"),
        Regex::new(r"^([0-9]{5})$").expect("valid regex"),
    ]
});

/// Returns the five digit postcode, or `None` when `raw` is in none of the
/// known formats.
pub fn normalize_postcode(raw: &str) -> Option<String> {
    POSTCODE_FORMATS
        .iter()
        .find_map(|format| format.captures(raw))
        .and_then(|caps| caps.get(1))
        .map(|code| code.as_str().to_string())
}
