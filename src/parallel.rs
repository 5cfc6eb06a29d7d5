//! Batch segmentation of independent documents.
//!
//! Each document gets its own builder; the scope tables are built once per format
//! and shared read-only. With the `parallel` feature the documents are processed
//! on the rayon thread pool.

use crate::config::{Config, SourceFormat};
use crate::scope::ScopeTable;
use crate::segment::Document;
use crate::{builder, sanitize};
use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One document to segment
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub source: String,
    pub format: SourceFormat,
}

impl DocumentInput {
    pub fn new(source: impl Into<String>, format: SourceFormat) -> Self {
        Self {
            source: source.into(),
            format,
        }
    }
}

/// Segment every input; results are in input order
pub fn segment_all(inputs: &[DocumentInput], config: &Config) -> Vec<Document> {
    let tables: BTreeMap<SourceFormat, ScopeTable> = inputs
        .iter()
        .map(|input| (input.format, config.scope_table(input.format)))
        .collect();

    let run = |input: &DocumentInput| match tables.get(&input.format) {
        Some(table) => builder::segment(&sanitize(&input.source), input.format, table),
        None => Document::default(),
    };

    #[cfg(feature = "parallel")]
    {
        log::debug!("Segmenting {} documents in parallel", inputs.len());
        inputs.par_iter().map(run).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        inputs.iter().map(run).collect()
    }
}
