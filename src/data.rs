pub mod document;
pub mod osm;

pub use self::document::{Address, Created, Document};
pub use self::osm::{ElementKind, RawChild, RawElement};
