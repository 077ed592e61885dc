//! SQLite table `scrapedData`.

use super::table::{cell_text, OutputTable};
use super::MergePolicy;
use crate::error::StoreError;
use rusqlite::Connection;
use std::path::Path;

pub const TABLE_NAME: &str = "scrapedData";

pub fn write(table: &OutputTable, path: &Path, policy: MergePolicy) -> Result<usize, StoreError> {
    if policy == MergePolicy::MergeWholeTable {
        return Err(StoreError::UnsupportedPolicy {
            sink: "sqlite",
            policy,
        });
    }
    write_rows(table, path, policy == MergePolicy::Replace).map_err(|source| {
        StoreError::Sqlite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(table.len())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn write_rows(table: &OutputTable, path: &Path, replace: bool) -> rusqlite::Result<()> {
    let mut db = Connection::open(path)?;
    let tx = db.transaction()?;
    let name = quote_ident(TABLE_NAME);

    if replace {
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {name};"))?;
    }
    let columns = table
        .columns()
        .iter()
        .map(|c| format!("{} TEXT", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    tx.execute_batch(&format!("CREATE TABLE IF NOT EXISTS {name} ({columns});"))?;

    {
        let names = table
            .columns()
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=table.columns().len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {name} ({names}) VALUES ({placeholders})"
        ))?;
        for row in table.rows() {
            stmt.execute(rusqlite::params_from_iter(row.iter().map(cell_text)))?;
        }
    }

    tx.commit()
}
