use std::{io, num::ParseFloatError, str::Utf8Error};

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attr(#[from] AttrError),

    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] Utf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Latitude or longitude text that is not a float.
    #[error("Invalid coordinate {attribute}='{value}': {source}")]
    InvalidCoordinate {
        attribute: &'static str,
        value: String,
        #[source]
        source: ParseFloatError,
    },

    /// `NaN` and the infinities parse as floats but are not positions.
    #[error("Non-finite coordinate {attribute}='{value}'")]
    NonFiniteCoordinate { attribute: &'static str, value: String },

    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("{0}")]
    Message(String),
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Message(value.to_string())
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Message(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
