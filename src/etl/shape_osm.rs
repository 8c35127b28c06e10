use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::UserConfig;
use crate::data::document::Document;
use crate::data::osm::{ElementKind, RawElement};
use crate::errors::Result;
use crate::shape::{shape_element, Shaped};

use super::parse_osm::{open_osm, OsmReader};
use super::{write_atomically, Etl};

pub const ETL_NAME: &str = "shape_osm";
pub const OUTPUT_FILE_NAME: &str = "documents.json";

/// Counts of what happened to the elements of one input file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeStats {
    pub nodes: usize,
    pub ways: usize,
    pub skipped: usize,
    pub rejected: BTreeMap<&'static str, usize>,
}

impl ShapeStats {
    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// Lazily shapes elements as they are pulled, one at a time, counting every
/// outcome on the way. Yields accepted documents and stops at the first read
/// or parse error.
pub struct ShapedDocuments {
    elements: Box<dyn Iterator<Item = Result<RawElement>>>,
    stats: ShapeStats,
    failed: bool,
}

impl ShapedDocuments {
    pub fn new(elements: Box<dyn Iterator<Item = Result<RawElement>>>) -> Self {
        ShapedDocuments {
            elements,
            stats: ShapeStats::default(),
            failed: false,
        }
    }

    /// Counts for the elements pulled so far.
    pub fn stats(&self) -> &ShapeStats {
        &self.stats
    }
}

impl Iterator for ShapedDocuments {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        for element_res in self.elements.by_ref() {
            let shaped = element_res.and_then(|element| {
                let shaped = shape_element(&element)?;
                Ok(ShapeOsmEtl::record(&mut self.stats, &element, shaped))
            });
            match shaped {
                Ok(Some(doc)) => return Some(Ok(doc)),
                Ok(None) => continue,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                },
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonFormat {
    pub pretty: bool,
    /// One JSON array instead of one document per line.
    pub array: bool,
}

pub struct ShapeOsmEtl {
    data_path: PathBuf,
    format: JsonFormat,
    progress: bool,
}

impl ShapeOsmEtl {
    pub fn new(config: &UserConfig) -> ShapeOsmEtl {
        ShapeOsmEtl {
            data_path: PathBuf::from(&config.data_path),
            format: JsonFormat {
                pretty: config.pretty,
                array: config.json_array,
            },
            progress: config.progress,
        }
    }

    fn record(stats: &mut ShapeStats, element: &RawElement, shaped: Shaped) -> Option<Document> {
        match shaped {
            Shaped::Document(doc) => {
                match doc.kind {
                    ElementKind::Node => stats.nodes += 1,
                    ElementKind::Way => stats.ways += 1,
                }
                Some(doc)
            },
            Shaped::Skipped => {
                stats.skipped += 1;
                None
            },
            Shaped::Rejected(rejection) => {
                let reason = rejection.to_string();
                debug!(id = element.id(), kind = rejection.kind(), reason = reason.as_str(); "Rejected element");
                *stats.rejected.entry(rejection.kind()).or_insert(0) += 1;
                None
            },
        }
    }
}

/// Writes documents either one per line or as a single array, each as soon
/// as it is pulled. The first error is returned as is.
pub fn write_documents<W, I>(writer: &mut W, documents: I, format: JsonFormat) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = Result<Document>>,
{
    if format.array {
        writer.write_all(b"[")?;
    }
    for (idx, doc_res) in documents.into_iter().enumerate() {
        let doc = doc_res?;
        if format.array && idx > 0 {
            writer.write_all(b",\n")?;
        }
        if format.pretty {
            serde_json::to_writer_pretty(&mut *writer, &doc)?;
        } else {
            serde_json::to_writer(&mut *writer, &doc)?;
        }
        if !format.array {
            writer.write_all(b"\n")?;
        }
    }
    if format.array {
        writer.write_all(b"]")?;
    }
    Ok(())
}

impl Etl for ShapeOsmEtl {
    type Input = OsmReader<Box<dyn BufRead>>;
    type Output = ShapedDocuments;

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
        Ok(ShapedDocuments::new(elements))
    }

    fn load(&mut self, dir: &Path, mut output: Self::Output) -> Result<()> {
        let format = self.format;
        write_atomically(&self.output_path(dir), |writer| {
            write_documents(writer, output.by_ref(), format)
        })?;

        let stats = output.stats();
        info!(
            etl_name = ETL_NAME,
            nodes = stats.nodes,
            ways = stats.ways,
            skipped = stats.skipped,
            rejected = stats.rejected_total();
            "Shaped elements"
        );
        for (kind, count) in &stats.rejected {
            info!(etl_name = ETL_NAME, kind = *kind, count = *count; "Rejections");
        }
        Ok(())
    }
}
