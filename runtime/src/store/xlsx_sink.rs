//! Single-sheet workbook, rewritten on every run.

use super::table::{cell_text, OutputTable};
use super::MergePolicy;
use crate::error::StoreError;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;

pub const SHEET_NAME: &str = "Sheet1";

pub fn write(table: &OutputTable, path: &Path, policy: MergePolicy) -> Result<usize, StoreError> {
    if policy != MergePolicy::Replace {
        return Err(StoreError::UnsupportedPolicy {
            sink: "xlsx",
            policy,
        });
    }
    write_workbook(table, path).map_err(|source| StoreError::Xlsx {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(table.len())
}

fn write_workbook(table: &OutputTable, path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, name) in table.columns().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name, &header)?;
    }
    for (r, row) in table.rows().iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            if let Some(text) = cell_text(cell) {
                sheet.write_string(r as u32 + 1, col as u16, text)?;
            }
        }
    }
    workbook.save(path)
}
