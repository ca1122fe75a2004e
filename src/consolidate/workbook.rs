use rust_xlsxwriter::{Format, Workbook};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

use super::table::ConsolidatedTable;
use super::ConsolidateError;
use crate::tables::PERIOD_COLUMN;
use crate::utils::sheet_name;

/// Excel's hard row limit, header row included.
const MAX_ROWS: usize = 1_048_576;
/// Excel's hard column limit, period column included.
const MAX_COLUMNS: usize = 16_384;

/// Collects one sheet per table and writes the `.xlsx` file once, on `close`.
pub struct WorkbookWriter {
    workbook: Workbook,
    header: Format,
    path: PathBuf,
    sheets: Vec<String>,
}

impl WorkbookWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            workbook: Workbook::new(),
            header: Format::new().set_bold(),
            path: path.into(),
            sheets: Vec::new(),
        }
    }

    pub fn sheets(&self) -> &[String] {
        &self.sheets
    }

    /// Add `table` as a sheet: `period` plus one column per label in row 0,
    /// then one row per period, newest first.
    #[instrument(skip(self, table), fields(table = table.name(), rows = table.len()))]
    pub fn add_table(&mut self, table: &ConsolidatedTable) -> Result<(), ConsolidateError> {
        if table.len() + 1 > MAX_ROWS || table.columns().len() + 1 > MAX_COLUMNS {
            return Err(ConsolidateError::TooLarge {
                table: table.name().to_string(),
                rows: table.len(),
                columns: table.columns().len(),
            });
        }

        // Excel compares sheet names case-insensitively.
        let name = sheet_name(table.name());
        let folded = name.to_lowercase();
        if let Some(existing) = self.sheets.iter().find(|s| s.to_lowercase() == folded) {
            return Err(ConsolidateError::SheetNameClash {
                table: table.name().to_string(),
                sheet: existing.clone(),
            });
        }

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&name)?;

        worksheet.write_string_with_format(0, 0, PERIOD_COLUMN, &self.header)?;
        for (col, label) in table.columns().iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16 + 1, label, &self.header)?;
        }

        for (row, (period, values)) in table.rows_desc().enumerate() {
            let row = row as u32 + 1;
            worksheet.write_string_with_format(row, 0, period, &self.header)?;
            for (col, value) in values.iter().enumerate() {
                if let Some(value) = value {
                    worksheet.write_number(row, col as u16 + 1, *value)?;
                }
            }
        }

        debug!(
            "Added sheet {} with {} columns and {} rows",
            name,
            table.columns().len(),
            table.len()
        );
        self.sheets.push(name);
        Ok(())
    }

    /// Write the workbook to disk, creating the parent directory if needed.
    pub fn close(mut self) -> Result<PathBuf, ConsolidateError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConsolidateError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        self.workbook.save(&self.path)?;
        info!(
            "Saved workbook {} with {} sheets",
            self.path.display(),
            self.sheets.len()
        );
        Ok(self.path)
    }
}
