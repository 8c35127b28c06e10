//! Shapes OpenStreetMap XML into flat JSON documents for a document store.

pub mod config;
pub mod data;
pub mod errors;
pub mod etl;
pub mod shape;

pub use crate::errors::{Error, Result};
pub use crate::shape::{shape_element, transform, Rejection, Shaped};
