//! Shaping of raw OSM elements into flat documents.
//!
//! Every top level element goes through [`shape_element`]: the kind decides
//! whether it is a candidate at all, the element's own attributes seed the
//! document, then every child attribute is evaluated in order. The first
//! rejected tag throws the whole document away.

pub mod attributes;
pub mod postcode;
pub mod street;
pub mod tags;

use log::debug;
use thiserror::Error;

use crate::data::document::Document;
use crate::data::osm::{ElementKind, RawElement};
use crate::errors::Result;

use self::attributes::split_attributes;
use self::tags::{apply, evaluate, TagRule};

/// Why a node or way was dropped. Expected for dirty input, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("tag key '{0}' contains problematic characters")]
    ProblemChars(String),
    #[error("address tag '{0}' has more than one qualifier")]
    NestedAddress(String),
    #[error("address tag '{0}' is not street, housenumber or postcode")]
    UnknownAddressField(String),
    #[error("tag key '{0}' starts with a colon")]
    LeadingColon(String),
    #[error("postcode '{0}' is in no known format")]
    InvalidPostcode(String),
}

impl Rejection {
    /// Short label used when counting rejections.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::ProblemChars(_) => "problem_chars",
            Rejection::NestedAddress(_) => "nested_address",
            Rejection::UnknownAddressField(_) => "unknown_address_field",
            Rejection::LeadingColon(_) => "leading_colon",
            Rejection::InvalidPostcode(_) => "invalid_postcode",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shaped {
    Document(Document),
    /// Not a node or way.
    Skipped,
    Rejected(Rejection),
}

pub fn shape_element(element: &RawElement) -> Result<Shaped> {
    let Some(kind) = ElementKind::classify(&element.name) else {
        return Ok(Shaped::Skipped);
    };
    let mut doc = split_attributes(kind, element)?;

    for child in &element.children {
        for (key, value) in &child.attributes {
            match evaluate(child, key, value)? {
                TagRule::Reject(rejection) => return Ok(Shaped::Rejected(rejection)),
                rule => {
                    if !apply(&mut doc, rule) {
                        debug!(id = element.id(), key = key.as_str(), value = value.as_str(); "Dropping tag with reserved name");
                    }
                }
            }
        }
    }
    Ok(Shaped::Document(doc))
}

/// Document for `element`, or `None` when it is not a node or way or was
/// rejected.
pub fn transform(element: &RawElement) -> Result<Option<Document>> {
    match shape_element(element)? {
        Shaped::Document(doc) => Ok(Some(doc)),
        Shaped::Skipped => Ok(None),
        Shaped::Rejected(rejection) => {
            let reason = rejection.to_string();
            debug!(id = element.id(), reason = reason.as_str(); "Rejected element");
            Ok(None)
        }
    }
}
