use std::sync::LazyLock;

use regex::Regex;

use crate::data::document::{AddressField, Document, ProvenanceKey};
use crate::data::osm::RawChild;
use crate::errors::{Error, Result};

use super::postcode::normalize_postcode;
use super::street::STREET_TYPES;
use super::Rejection;

/// Characters that make a tag key unusable as a document field name.
pub static PROBLEM_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[=\+/&<>;'"\?%#$@,\. \t\r\n]"#).expect("valid regex"));

const ADDRESS_PREFIX: &str = "addr:";

/// What a single child attribute does to the document under construction.
#[derive(Debug, Clone, PartialEq)]
pub enum TagRule<'a> {
    Created(ProvenanceKey, &'a str),
    Address(AddressField, String),
    Field(&'a str, &'a str),
    NodeRef(&'a str),
    Skip,
    Reject(Rejection),
}

fn companion_value<'a>(child: &'a RawChild) -> Result<&'a str> {
    child.attribute("v").ok_or_else(|| Error::MissingAttribute {
        element: child.name.clone(),
        attribute: "v",
    })
}

fn address_rule<'a>(child: &'a RawChild, tag_key: &str) -> Result<TagRule<'a>> {
    if tag_key.matches(':').count() > 1 {
        return Ok(TagRule::Reject(Rejection::NestedAddress(tag_key.to_string())));
    }
    let suffix = &tag_key[ADDRESS_PREFIX.len()..];
    let Some(field) = AddressField::from_suffix(suffix) else {
        return Ok(TagRule::Reject(Rejection::UnknownAddressField(tag_key.to_string())));
    };
    let value = companion_value(child)?;
    let rule = match field {
        AddressField::Street => TagRule::Address(field, STREET_TYPES.normalize(value)),
        AddressField::HouseNumber => TagRule::Address(field, value.to_string()),
        AddressField::Postcode => match normalize_postcode(value) {
            Some(postcode) => TagRule::Address(field, postcode),
            None => TagRule::Reject(Rejection::InvalidPostcode(value.to_string())),
        },
    };
    Ok(rule)
}

/// Decides what the attribute `key="value"` of `child` contributes. Exactly
/// one rule applies, checked in order: provenance, problem characters,
/// address, leading colon, plain tag, node reference, pass-through.
pub fn evaluate<'a>(child: &'a RawChild, key: &'a str, value: &'a str) -> Result<TagRule<'a>> {
    if let Some(provenance) = ProvenanceKey::from_key(key) {
        return Ok(TagRule::Created(provenance, value));
    }
    if key == "k" {
        if PROBLEM_CHARS.is_match(value) {
            return Ok(TagRule::Reject(Rejection::ProblemChars(value.to_string())));
        }
        if value.starts_with(ADDRESS_PREFIX) {
            return address_rule(child, value);
        }
        if value.starts_with(':') {
            return Ok(TagRule::Reject(Rejection::LeadingColon(value.to_string())));
        }
        if !value.starts_with("addr") {
            return Ok(TagRule::Field(value, companion_value(child)?));
        }
        return Ok(TagRule::Skip);
    }
    if key == "ref" {
        return Ok(TagRule::NodeRef(value));
    }
    match key {
        "lat" | "lon" | "v" => Ok(TagRule::Skip),
        _ => Ok(TagRule::Field(key, value)),
    }
}

/// Applies an accepted rule. Returns false when the rule named a reserved
/// field and was dropped.
pub fn apply(doc: &mut Document, rule: TagRule<'_>) -> bool {
    match rule {
        TagRule::Created(key, value) => doc.created.set(key, value),
        TagRule::Address(field, value) => doc.address_mut().set(field, value),
        TagRule::Field(name, value) => return doc.set_field(name, value),
        TagRule::NodeRef(node_ref) => doc.push_node_ref(node_ref),
        TagRule::Skip | TagRule::Reject(_) => {}
    }
    true
}
