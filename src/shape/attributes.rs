use log::debug;

use crate::data::document::{Document, ProvenanceKey};
use crate::data::osm::{ElementKind, RawElement};
use crate::errors::{Error, Result};

fn parse_coordinate(attribute: &'static str, value: &str) -> Result<f64> {
    let coordinate: f64 = value.parse().map_err(|source| Error::InvalidCoordinate {
        attribute,
        value: value.to_string(),
        source,
    })?;
    if !coordinate.is_finite() {
        return Err(Error::NonFiniteCoordinate {
            attribute,
            value: value.to_string(),
        });
    }
    Ok(coordinate)
}

/// `[lat, lon]` when the element has a latitude. A latitude without a
/// longitude is malformed input.
pub fn position(element: &RawElement) -> Result<Option<[f64; 2]>> {
    let Some(lat) = element.attribute("lat") else {
        return Ok(None);
    };
    let lon = element.attribute("lon").ok_or_else(|| Error::MissingAttribute {
        element: element.name.clone(),
        attribute: "lon",
    })?;
    Ok(Some([parse_coordinate("lat", lat)?, parse_coordinate("lon", lon)?]))
}

/// Seeds the document from the element's own attributes: type, position,
/// provenance under `created`, everything else as flat string fields.
pub fn split_attributes(kind: ElementKind, element: &RawElement) -> Result<Document> {
    let mut doc = Document::new(kind);
    doc.pos = position(element)?;

    for (key, value) in &element.attributes {
        if let Some(provenance) = ProvenanceKey::from_key(key) {
            doc.created.set(provenance, value);
        } else if key == "lat" || key == "lon" {
            continue;
        } else if !doc.set_field(key, value) {
            debug!(id = element.id(), attribute = key.as_str(); "Dropping attribute with reserved name");
        }
    }
    Ok(doc)
}
