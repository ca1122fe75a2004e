// Per-series CSV files laid out as `<root>/<table>/<region>.csv`

use glob::{glob_with, MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::fetcher::{cell_text, SeriesResponse};
use crate::series::SeriesId;

pub const PERIOD_COLUMN: &str = "period";
pub const VALUE_COLUMN: &str = "value";
pub const DESCRIPTION_COLUMN: &str = "seriesDescription";

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Tables directory not found: {0}")]
    MissingRoot(String),

    #[error("{path} is missing required column {column:?}")]
    MissingColumn { path: String, column: &'static str },

    #[error("{0} has no data rows")]
    NoRows(String),

    #[error("{0} has an empty seriesDescription in its first row")]
    MissingDescription(String),

    #[error("Invalid value {value:?} at row {row} of {path}")]
    InvalidValue {
        path: String,
        row: usize,
        value: String,
    },
}

/// One region file reduced to the columns consolidation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionColumn {
    pub description: String,
    pub values: Vec<(String, Option<f64>)>,
}

#[derive(Debug, Clone)]
pub struct TablesDir {
    root: PathBuf,
}

impl TablesDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn region_path(&self, series_id: &SeriesId) -> PathBuf {
        self.root
            .join(series_id.table())
            .join(format!("{}.csv", series_id.region()))
    }

    /// Write one response as `<table>/<region>.csv`, replacing any earlier file.
    ///
    /// The header is every field name seen in the response, in first-seen order.
    #[instrument(skip(self, response), fields(rows = response.rows.len()))]
    pub fn write_region(
        &self,
        series_id: &SeriesId,
        response: &SeriesResponse,
    ) -> Result<PathBuf, TableError> {
        let dir = self.root.join(series_id.table());
        fs::create_dir_all(&dir).map_err(|source| TableError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let path = self.region_path(series_id);
        let csv_err = |source| TableError::Csv {
            path: path.display().to_string(),
            source,
        };

        let mut header: Vec<&str> = Vec::new();
        for row in &response.rows {
            for key in row.fields.keys() {
                if !header.contains(&key.as_str()) {
                    header.push(key);
                }
            }
        }

        let mut writer = csv::Writer::from_path(&path).map_err(csv_err)?;
        writer.write_record(&header).map_err(csv_err)?;
        for row in &response.rows {
            let record = header
                .iter()
                .map(|key| row.fields.get(*key).map(cell_text).unwrap_or_default());
            writer.write_record(record).map_err(csv_err)?;
        }
        writer.flush().map_err(|source| TableError::Io {
            path: path.display().to_string(),
            source,
        })?;

        debug!("Wrote {} rows to {}", response.rows.len(), path.display());
        Ok(path)
    }

    /// Table directories directly under the root, sorted by name.
    pub fn list_tables(&self) -> Result<Vec<PathBuf>, TableError> {
        if !self.root.is_dir() {
            return Err(TableError::MissingRoot(self.root.display().to_string()));
        }

        let pattern = format!("{}/*", Pattern::escape(&self.root.to_string_lossy()));
        Ok(glob_with(&pattern, visible_only())?
            .filter_map(Result::ok)
            .filter(|path| path.is_dir())
            .collect())
    }

    /// Region files of one table directory, sorted by name.
    pub fn list_regions(&self, table_dir: &Path) -> Result<Vec<PathBuf>, TableError> {
        let pattern = format!("{}/*.csv", Pattern::escape(&table_dir.to_string_lossy()));
        Ok(glob_with(&pattern, visible_only())?
            .filter_map(Result::ok)
            .filter(|path| path.is_file())
            .collect())
    }
}

// Dot-entries (`.cache`, `.ipynb_checkpoints`) are never tables or regions.
fn visible_only() -> MatchOptions {
    MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    }
}

/// Load `period`, `value` and the first row's `seriesDescription` from a region file.
pub fn read_region(path: &Path) -> Result<RegionColumn, TableError> {
    let display = path.display().to_string();
    let csv_err = |source| TableError::Csv {
        path: display.clone(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TableError::MissingColumn {
                path: display.clone(),
                column: name,
            })
    };
    let period_idx = column(PERIOD_COLUMN)?;
    let value_idx = column(VALUE_COLUMN)?;
    let description_idx = column(DESCRIPTION_COLUMN)?;

    let mut description = None;
    let mut values = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let period = record.get(period_idx).unwrap_or_default().to_string();
        let raw = record.get(value_idx).unwrap_or_default().trim();
        let value = if raw.is_empty() {
            None
        } else {
            let parsed = raw.parse::<f64>().map_err(|_| TableError::InvalidValue {
                path: display.clone(),
                row,
                value: raw.to_string(),
            })?;
            // NaN and infinities stay blank in the sheet
            parsed.is_finite().then_some(parsed)
        };

        if description.is_none() {
            description = Some(record.get(description_idx).unwrap_or_default().to_string());
        }
        values.push((period, value));
    }

    let description = description.ok_or_else(|| TableError::NoRows(display.clone()))?;
    if description.trim().is_empty() {
        return Err(TableError::MissingDescription(display));
    }

    Ok(RegionColumn {
        description,
        values,
    })
}
