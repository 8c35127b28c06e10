use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use xz::bufread::XzDecoder;

use crate::data::osm::{RawChild, RawElement};
use crate::errors::Result;

/// Streams the children of the `<osm>` root one at a time, each with its own
/// direct children. Anything nested deeper is ignored.
pub struct OsmReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    depth: usize,
    current: Option<RawElement>,
    done: bool,
}

fn element_name(e: &BytesStart) -> Result<String> {
    Ok(str::from_utf8(e.name().as_ref())?.to_string())
}

fn read_attributes(e: &BytesStart) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    for attribute_res in e.attributes() {
        let attribute = attribute_res?;
        let key = str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(attributes)
}

fn raw_element(e: &BytesStart) -> Result<RawElement> {
    Ok(RawElement {
        name: element_name(e)?,
        attributes: read_attributes(e)?,
        children: Vec::new(),
    })
}

fn raw_child(e: &BytesStart) -> Result<RawChild> {
    Ok(RawChild {
        name: element_name(e)?,
        attributes: read_attributes(e)?,
    })
}

impl<R: BufRead> OsmReader<R> {
    pub fn new(inner: R) -> Self {
        let mut reader = Reader::from_reader(inner);
        reader.trim_text(true);
        OsmReader {
            reader,
            buf: Vec::new(),
            depth: 0,
            current: None,
            done: false,
        }
    }

    /// Next top level element, or `None` at the end of the document.
    pub fn next_element(&mut self) -> Result<Option<RawElement>> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Eof => return Ok(None),
                Event::Start(e) => {
                    match self.depth {
                        1 => self.current = Some(raw_element(&e)?),
                        2 => {
                            if let Some(current) = self.current.as_mut() {
                                current.children.push(raw_child(&e)?);
                            }
                        },
                        _ => (),
                    }
                    self.depth += 1;
                },
                Event::Empty(e) => match self.depth {
                    1 => return Ok(Some(raw_element(&e)?)),
                    2 => {
                        if let Some(current) = self.current.as_mut() {
                            current.children.push(raw_child(&e)?);
                        }
                    },
                    _ => (),
                },
                Event::End(_e) => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 1 {
                        if let Some(element) = self.current.take() {
                            return Ok(Some(element));
                        }
                    }
                },
                // Declarations, comments and whitespace carry nothing we shape.
                _ => (),
            }
        }
    }
}

impl<R: BufRead> Iterator for OsmReader<R> {
    type Item = Result<RawElement>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = self.next_element();
        if !matches!(next, Ok(Some(_))) {
            self.done = true;
        }
        next.transpose()
    }
}

/// Opens an .osm file, decompressing it on the fly when it ends in `.xz`.
pub fn open_osm(path: &Path) -> Result<OsmReader<Box<dyn BufRead>>> {
    let file_reader = BufReader::new(fs::File::open(path)?);
    let inner: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "xz") {
        Box::new(BufReader::new(XzDecoder::new(file_reader)))
    } else {
        Box::new(file_reader)
    };
    Ok(OsmReader::new(inner))
}
