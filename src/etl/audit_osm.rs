use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::info;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::UserConfig;
use crate::data::osm::RawElement;
use crate::errors::Result;
use crate::shape::street::{street_type, StreetTypes, STREET_TYPES};
use crate::shape::tags::PROBLEM_CHARS;

use super::parse_osm::{open_osm, OsmReader};
use super::{write_atomically, Etl};

pub const ETL_NAME: &str = "audit_osm";
pub const OUTPUT_FILE_NAME: &str = "audit.json";

static LOWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]|_)*$").expect("valid regex"));
static LOWER_COLON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]|_)*:([a-z]|_)*$").expect("valid regex"));

/// Tag keys bucketed by shape, to see how much of the data the shaper will
/// keep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTypes {
    pub lower: usize,
    pub lower_colon: usize,
    pub problemchars: usize,
    pub other: usize,
}

impl KeyTypes {
    pub fn count(&mut self, key: &str) {
        if LOWER.is_match(key) {
            self.lower += 1;
        } else if LOWER_COLON.is_match(key) {
            self.lower_colon += 1;
        } else if PROBLEM_CHARS.is_match(key) {
            self.problemchars += 1;
        } else {
            self.other += 1;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub key_types: KeyTypes,
    /// Street types outside the expected set, with every name they end.
    pub street_types: BTreeMap<String, BTreeSet<String>>,
}

impl AuditReport {
    pub fn audit_street_type(&mut self, street_types: &StreetTypes, street_name: &str) {
        if let Some(found) = street_type(street_name) {
            if !street_types.is_expected(found) {
                self.street_types
                    .entry(found.to_string())
                    .or_default()
                    .insert(street_name.to_string());
            }
        }
    }

    pub fn audit_element(&mut self, street_types: &StreetTypes, element: &RawElement) {
        for child in element.children.iter().filter(|child| child.name == "tag") {
            let Some(key) = child.attribute("k") else {
                continue;
            };
            self.key_types.count(key);
            if key == "addr:street" {
                if let Some(name) = child.attribute("v") {
                    self.audit_street_type(street_types, name);
                }
            }
        }
    }
}

pub struct AuditOsmEtl {
    data_path: PathBuf,
    progress: bool,
}

impl AuditOsmEtl {
    pub fn new(config: &UserConfig) -> AuditOsmEtl {
        AuditOsmEtl {
            data_path: PathBuf::from(&config.data_path),
            progress: config.progress,
        }
    }
}

impl Etl for AuditOsmEtl {
    type Input = OsmReader<Box<dyn BufRead>>;
    type Output = AuditReport;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn output_file_name(&self) -> &str {
        OUTPUT_FILE_NAME
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        open_osm(&self.data_path)
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let elements: Box<dyn Iterator<Item = Result<RawElement>>> = if self.progress {
            Box::new(tqdm::tqdm(input))
        } else {
            Box::new(input)
        };

        let mut report = AuditReport::default();
        for element_res in elements {
            report.audit_element(&STREET_TYPES, &element_res?);
        }
        info!(
            etl_name = ETL_NAME,
            lower = report.key_types.lower,
            lower_colon = report.key_types.lower_colon,
            problemchars = report.key_types.problemchars,
            other = report.key_types.other,
            unexpected_street_types = report.street_types.len();
            "Audited tag keys"
        );
        Ok(report)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        write_atomically(&self.output_path(dir), |writer| {
            Ok(serde_json::to_writer_pretty(writer, &output)?)
        })
    }
}
