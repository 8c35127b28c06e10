use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

/// Last whitespace separated token of a street name, trailing period included.
static STREET_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\S+\.?$").expect("valid regex"));

const EXPECTED: [&str; 22] = [
    "Street", "Avenue", "Boulevard", "Drive", "Court", "Place", "Square", "Lane", "Road", "Trail",
    "Parkway", "Commons", "Way", "Loop", "East", "West", "Terrace", "Expressway", "Plaza", "Hill",
    "Highway", "Circle",
];

const ABBREVIATIONS: [(&str, &str); 11] = [
    ("St", "Street"),
    ("St.", "Street"),
    ("Sq.", "Square"),
    ("Sq", "Square"),
    ("Ave", "Avenue"),
    ("Rd.", "Road"),
    ("Rd", "Road"),
    ("Blvd", "Boulevard"),
    ("Cir", "Circle"),
    ("Dr", "Drive"),
    ("Hwy", "Highway"),
];

pub static STREET_TYPES: LazyLock<StreetTypes> =
    LazyLock::new(|| StreetTypes::new(&EXPECTED, &ABBREVIATIONS));

/// Street suffix vocabulary: the spelled out types we accept as they are and
/// the abbreviations we know how to expand.
#[derive(Debug, Clone)]
pub struct StreetTypes {
    expected: HashSet<&'static str>,
    mapping: HashMap<&'static str, &'static str>,
}

impl StreetTypes {
    pub fn new(expected: &[&'static str], mapping: &[(&'static str, &'static str)]) -> Self {
        StreetTypes {
            expected: expected.iter().copied().collect(),
            mapping: mapping.iter().copied().collect(),
        }
    }

    pub fn is_expected(&self, street_type: &str) -> bool {
        self.expected.contains(street_type)
    }

    /// Expands an abbreviated trailing street type. Unknown abbreviations are
    /// returned unchanged. Only the trailing occurrence is replaced, so
    /// "St Marks St" becomes "St Marks Street".
    pub fn normalize(&self, name: &str) -> String {
        let Some(m) = STREET_TYPE_RE.find(name) else {
            return name.to_string();
        };
        if self.is_expected(m.as_str()) {
            return name.to_string();
        }
        match self.mapping.get(m.as_str()) {
            Some(full) => format!("{}{}", &name[..m.start()], full),
            None => name.to_string(),
        }
    }
}

/// Trailing token of `name`, if it has one.
pub fn street_type(name: &str) -> Option<&str> {
    STREET_TYPE_RE.find(name).map(|m| m.as_str())
}
