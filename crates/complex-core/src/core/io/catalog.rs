//! Readers for the reference catalog's tab-separated dumps.
//!
//! Each dump carries a header row. Rows with an unexpected number of columns are
//! skipped rather than treated as errors, since the dumps contain free-text columns
//! that occasionally break the layout.

use super::traits::TabularInput;
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use tracing::debug;

const COMPLEX_COLUMNS: usize = 5;
const COMPONENT_COLUMNS: usize = 5;
const CROSS_REFERENCE_COLUMNS: usize = 3;
const ORGANISM_COLUMNS: usize = 2;

/// Only components from this database describe protein participants.
pub const PROTEIN_DATABASE: &str = "uniprotkb";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogComplexRow {
    pub complex_id: String,
    pub name: String,
    pub descriptor: String,
    /// Species of the complex as a whole; `-` in the dump reads as `None`.
    pub taxonomy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogComponentRow {
    pub complex_id: String,
    pub accession: String,
    /// Kept raw; the loader reports values that are not positive integers.
    pub stoichiometry: String,
    pub organism: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCrossReferenceRow {
    pub complex_id: String,
    /// Comma-joined structure tokens, unnormalized.
    pub structures: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganismRow {
    pub accession: String,
    pub organism: String,
}

fn tsv_records<R: Read>(reader: R) -> impl Iterator<Item = Result<StringRecord, csv::Error>> {
    ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(reader)
        .into_records()
}

fn field(record: &StringRecord, index: usize) -> String {
    record.get(index).unwrap_or_default().trim().to_string()
}

fn optional_field(record: &StringRecord, index: usize) -> Option<String> {
    let value = field(record, index);
    (!value.is_empty() && value != "-").then_some(value)
}

fn collect_rows<R, T, F>(reader: R, columns: usize, table: &str, mut convert: F) -> Result<Vec<T>, csv::Error>
where
    R: Read,
    F: FnMut(&StringRecord) -> Option<T>,
{
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in tsv_records(reader) {
        let record = result?;
        if record.len() != columns {
            skipped += 1;
            continue;
        }
        match convert(&record) {
            Some(row) => rows.push(row),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!("Skipped {} row(s) of the {} table.", skipped, table);
    }
    Ok(rows)
}

impl TabularInput for CatalogComplexRow {
    fn read_from<R: Read>(reader: R) -> Result<Vec<Self>, csv::Error> {
        collect_rows(reader, COMPLEX_COLUMNS, "complex", |record| {
            let complex_id = field(record, 0);
            (!complex_id.is_empty()).then(|| CatalogComplexRow {
                complex_id,
                name: field(record, 1),
                descriptor: field(record, 3),
                taxonomy: optional_field(record, 2),
            })
        })
    }
}

impl TabularInput for CatalogComponentRow {
    fn read_from<R: Read>(reader: R) -> Result<Vec<Self>, csv::Error> {
        collect_rows(reader, COMPONENT_COLUMNS, "component", |record| {
            if !field(record, 2).eq_ignore_ascii_case(PROTEIN_DATABASE) {
                return None;
            }
            Some(CatalogComponentRow {
                complex_id: field(record, 0),
                accession: field(record, 3),
                stoichiometry: field(record, 4),
                organism: None,
            })
        })
    }
}

impl TabularInput for CatalogCrossReferenceRow {
    fn read_from<R: Read>(reader: R) -> Result<Vec<Self>, csv::Error> {
        collect_rows(reader, CROSS_REFERENCE_COLUMNS, "cross-reference", |record| {
            let structures = field(record, 2);
            (!structures.is_empty()).then(|| CatalogCrossReferenceRow {
                complex_id: field(record, 0),
                structures,
            })
        })
    }
}

impl TabularInput for OrganismRow {
    fn read_from<R: Read>(reader: R) -> Result<Vec<Self>, csv::Error> {
        collect_rows(reader, ORGANISM_COLUMNS, "organism", |record| {
            let accession = field(record, 0);
            let organism = field(record, 1);
            (!accession.is_empty() && !organism.is_empty())
                .then_some(OrganismRow { accession, organism })
        })
    }
}
