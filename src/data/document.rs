use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::osm::ElementKind;

/// Field names owned by the document structure. Tags and attributes can never
/// write to these.
pub const RESERVED_FIELDS: [&str; 5] = ["type", "pos", "created", "address", "node_refs"];

/// Flat document produced for every accepted node or way, ready to be written
/// out as one JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<[f64; 2]>,
    #[serde(default)]
    pub created: Created,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_refs: Option<Vec<String>>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl Document {
    pub fn new(kind: ElementKind) -> Self {
        Document {
            kind,
            pos: None,
            created: Created::default(),
            address: None,
            node_refs: None,
            fields: BTreeMap::new(),
        }
    }

    /// Stores a top level scalar field. Returns false, leaving the document
    /// untouched, when `name` collides with a structured field.
    pub fn set_field(&mut self, name: &str, value: &str) -> bool {
        if RESERVED_FIELDS.contains(&name) {
            return false;
        }
        self.fields.insert(name.to_string(), value.to_string());
        true
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn address_mut(&mut self) -> &mut Address {
        self.address.get_or_insert_with(Address::default)
    }

    /// Appends a way's node reference. No de-duplication: closed ways repeat
    /// their first node at the end.
    pub fn push_node_ref(&mut self, node_ref: &str) {
        self.node_refs
            .get_or_insert_with(Vec::new)
            .push(node_ref.to_string());
    }
}

/// Creation metadata. Only the five provenance keys exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changeset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvenanceKey {
    Version,
    Changeset,
    Timestamp,
    User,
    Uid,
}

impl ProvenanceKey {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "version" => Some(ProvenanceKey::Version),
            "changeset" => Some(ProvenanceKey::Changeset),
            "timestamp" => Some(ProvenanceKey::Timestamp),
            "user" => Some(ProvenanceKey::User),
            "uid" => Some(ProvenanceKey::Uid),
            _ => None,
        }
    }
}

impl Created {
    /// Last write wins.
    pub fn set(&mut self, key: ProvenanceKey, value: &str) {
        let slot = match key {
            ProvenanceKey::Version => &mut self.version,
            ProvenanceKey::Changeset => &mut self.changeset,
            ProvenanceKey::Timestamp => &mut self.timestamp,
            ProvenanceKey::User => &mut self.user,
            ProvenanceKey::Uid => &mut self.uid,
        };
        *slot = Some(value.to_string());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub housenumber: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    Street,
    HouseNumber,
    Postcode,
}

impl AddressField {
    /// Maps the part after `addr:` to a field.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "street" => Some(AddressField::Street),
            "housenumber" => Some(AddressField::HouseNumber),
            "postcode" => Some(AddressField::Postcode),
            _ => None,
        }
    }
}

impl Address {
    pub fn set(&mut self, field: AddressField, value: String) {
        match field {
            AddressField::Street => self.street = Some(value),
            AddressField::HouseNumber => self.housenumber = Some(value),
            AddressField::Postcode => self.postcode = Some(value),
        }
    }
}
