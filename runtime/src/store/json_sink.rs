//! JSON array of row objects. Merges with an existing file.

use super::table::OutputTable;
use super::MergePolicy;
use crate::error::StoreError;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub fn write(table: &OutputTable, path: &Path, policy: MergePolicy) -> Result<usize, StoreError> {
    match policy {
        MergePolicy::Replace => write_table(table, path),
        MergePolicy::MergeWholeTable if path.exists() => {
            let merged = read_table(path)?.concat(table);
            write_table(&merged, path)
        }
        MergePolicy::MergeWholeTable => write_table(table, path),
        MergePolicy::AppendRows => Err(StoreError::UnsupportedPolicy {
            sink: "json",
            policy,
        }),
    }
}

/// Load a file written by this sink.
pub fn read_table(path: &Path) -> Result<OutputTable, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    let Value::Array(rows) = value else {
        return Err(StoreError::JsonShape {
            path: path.to_path_buf(),
        });
    };
    OutputTable::from_json_rows(rows).ok_or_else(|| StoreError::JsonShape {
        path: path.to_path_buf(),
    })
}

fn write_table(table: &OutputTable, path: &Path) -> Result<usize, StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    serde_json::to_writer_pretty(&mut writer, &table.to_json_rows()).map_err(|source| {
        StoreError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.write_all(b"\n").map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    Ok(table.len())
}
