//! CSV export of annotation tables.
//!
//! Tables are written with a fixed header, so files from different runs line
//! up even when a corpus has no relation (or no entity) rows at all.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{AnnotationTable, TableRecord};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to create '{}': {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to open '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Write records as CSV, header first.
pub fn write_records<W: Write>(records: &[TableRecord], writer: W) -> Result<(), ExportError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(TableRecord::COLUMNS)?;
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_table<W: Write>(table: &AnnotationTable, writer: W) -> Result<(), ExportError> {
    write_records(&table.records(), writer)
}

/// Write records to a CSV file, creating parent directories.
pub fn write_records_path(records: &[TableRecord], path: &Path) -> Result<(), ExportError> {
    let create_error = |source: std::io::Error| ExportError::Create {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(create_error)?;
    }
    let file = std::fs::File::create(path).map_err(create_error)?;
    write_records(records, std::io::BufWriter::new(file))
}

/// Read records back from a table CSV.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<TableRecord>, ExportError> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for record in csv.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

pub fn read_records_path(path: &Path) -> Result<Vec<TableRecord>, ExportError> {
    let file = std::fs::File::open(path).map_err(|source| ExportError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_records(file)
}

/// One row per whitespace-separated word of `Texte`.
///
/// Rows without any word (relation rows, empty mentions) are kept once with
/// an empty `Texte`. Every other column is copied to each word row.
pub fn explode_words(records: &[TableRecord]) -> Vec<TableRecord> {
    let mut exploded = Vec::with_capacity(records.len());
    for record in records {
        let words: Vec<&str> = record
            .text
            .as_deref()
            .map(|text| text.split_whitespace().collect())
            .unwrap_or_default();

        if words.is_empty() {
            exploded.push(TableRecord {
                text: None,
                ..record.clone()
            });
            continue;
        }

        for word in words {
            exploded.push(TableRecord {
                text: Some(word.to_string()),
                ..record.clone()
            });
        }
    }
    exploded
}
