// Consolidation of per-region CSV files into one workbook
//
// Every table directory becomes one sheet. Region files are merged side by
// side on `period`, labelled by their cleaned series description.

pub mod table;
pub mod workbook;

pub use table::ConsolidatedTable;
pub use workbook::WorkbookWriter;

use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::tables::{read_region, TableError, TablesDir};
use crate::utils::clean_description;

#[derive(Debug, thiserror::Error)]
pub enum ConsolidateError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Table directory {0} contains no region files")]
    EmptyTable(String),

    #[error("No table directories found under {0}")]
    NoTables(String),

    #[error("Table {table} does not fit in a worksheet ({rows} rows, {columns} columns)")]
    TooLarge {
        table: String,
        rows: usize,
        columns: usize,
    },

    #[error("Table {table} maps to sheet name {sheet:?}, which is already taken")]
    SheetNameClash { table: String, sheet: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

#[derive(Debug, Clone)]
pub struct ConsolidateSummary {
    pub path: PathBuf,
    pub sheets: Vec<String>,
}

/// Merge every region file of one table directory.
#[instrument(skip(tables))]
pub fn build_table(tables: &TablesDir, table_dir: &Path) -> Result<ConsolidatedTable, ConsolidateError> {
    let name = table_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let regions = tables.list_regions(table_dir)?;
    if regions.is_empty() {
        return Err(ConsolidateError::EmptyTable(table_dir.display().to_string()));
    }

    let mut table = ConsolidatedTable::new(name);
    for path in regions {
        let region = read_region(&path)?;
        let label = clean_description(&region.description);
        if table.merge_column(&label, region.values) {
            warn!(
                "Column {:?} in table {} was already present; {} replaces it",
                label,
                table.name(),
                path.display()
            );
        }
    }

    Ok(table)
}

/// Build every table under `tables` and write them to the workbook at `output`.
///
/// Nothing is written to `output` unless every table succeeds.
#[instrument(skip(tables, progress), fields(root = %tables.root().display()))]
pub fn consolidate_all(
    tables: &TablesDir,
    output: &Path,
    progress: &ProgressBar,
) -> Result<ConsolidateSummary, ConsolidateError> {
    let table_dirs = tables.list_tables()?;
    if table_dirs.is_empty() {
        return Err(ConsolidateError::NoTables(tables.root().display().to_string()));
    }
    info!("Consolidating {} tables", table_dirs.len());

    progress.set_length(table_dirs.len() as u64);
    let mut writer = WorkbookWriter::new(output);
    for table_dir in &table_dirs {
        let table = build_table(tables, table_dir)?;
        progress.set_message(table.name().to_string());
        writer.add_table(&table)?;
        progress.inc(1);
    }

    let sheets = writer.sheets().to_vec();
    let path = writer.close()?;
    progress.finish_with_message(format!("✓ Wrote {} sheets", sheets.len()));

    Ok(ConsolidateSummary { path, sheets })
}
