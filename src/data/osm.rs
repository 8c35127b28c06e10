use serde::{Deserialize, Serialize};

/// Element as read from the .osm file, before any shaping. Attributes keep
/// document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<RawChild>,
}

/// Direct child of a top level element: a `<tag k=.. v=..>`, an `<nd ref=..>`
/// or anything else the file happens to nest there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawChild {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

fn find<'a>(attributes: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

impl RawElement {
    pub fn new(name: &str) -> Self {
        RawElement {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        find(&self.attributes, key)
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_tag(mut self, k: &str, v: &str) -> Self {
        self.children.push(RawChild::tag(k, v));
        self
    }

    pub fn with_node_ref(mut self, node_ref: &str) -> Self {
        self.children.push(RawChild::node_ref(node_ref));
        self
    }

    /// The `id` attribute, for log messages.
    pub fn id(&self) -> &str {
        self.attribute("id").unwrap_or("?")
    }
}

impl RawChild {
    pub fn new(name: &str) -> Self {
        RawChild {
            name: name.to_string(),
            attributes: Vec::new(),
        }
    }

    pub fn tag(k: &str, v: &str) -> Self {
        RawChild {
            name: "tag".to_string(),
            attributes: vec![("k".to_string(), k.to_string()), ("v".to_string(), v.to_string())],
        }
    }

    pub fn node_ref(node_ref: &str) -> Self {
        RawChild {
            name: "nd".to_string(),
            attributes: vec![("ref".to_string(), node_ref.to_string())],
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        find(&self.attributes, key)
    }
}

/// The two kinds of top level element that become documents. Relations,
/// bounds and everything else are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Way,
}

impl ElementKind {
    pub fn classify(name: &str) -> Option<Self> {
        match name {
            "node" => Some(ElementKind::Node),
            "way" => Some(ElementKind::Way),
            _ => None,
        }
    }
}
