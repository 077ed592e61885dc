//! Comma-separated rows with a header line.

use super::table::{cell_text, OutputTable};
use super::MergePolicy;
use crate::error::StoreError;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub fn write(table: &OutputTable, path: &Path, policy: MergePolicy) -> Result<usize, StoreError> {
    match policy {
        MergePolicy::AppendRows if path.exists() => append_rows(table, path),
        MergePolicy::MergeWholeTable if path.exists() => {
            let merged = read_table(path)?.concat(table);
            write_table(&merged, path)?;
            Ok(table.len())
        }
        _ => write_table(table, path),
    }
}

/// Load a file written by this sink. Every cell comes back as a string.
pub fn read_table(path: &Path) -> Result<OutputTable, StoreError> {
    let csv_err = |source| StoreError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(String::from)
        .collect();

    let mut table = OutputTable::new(headers.clone());
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        table.push_named(
            headers
                .iter()
                .cloned()
                .zip(record.iter().map(|cell| Value::String(cell.to_string()))),
        );
    }
    Ok(table)
}

fn write_table(table: &OutputTable, path: &Path) -> Result<usize, StoreError> {
    let mut writer = csv::Writer::from_path(path).map_err(|source| StoreError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    write_rows(&mut writer, table, true, path)?;
    Ok(table.len())
}

fn append_rows(table: &OutputTable, path: &Path) -> Result<usize, StoreError> {
    let file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    write_rows(&mut writer, table, false, path)?;
    Ok(table.len())
}

fn write_rows<W: Write>(
    writer: &mut csv::Writer<W>,
    table: &OutputTable,
    header: bool,
    path: &Path,
) -> Result<(), StoreError> {
    let csv_err = |source| StoreError::Csv {
        path: path.to_path_buf(),
        source,
    };
    if header {
        writer.write_record(table.columns()).map_err(csv_err)?;
    }
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|cell| cell_text(cell).unwrap_or_default()))
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
