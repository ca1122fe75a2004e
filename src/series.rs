use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SeriesIdError {
    #[error("Malformed series identifier {0:?}: expected TABLE_REGION")]
    Malformed(String),
    #[error("Failed to read series list {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A `TABLE_REGION` series identifier, e.g. `PAPR_NA`.
///
/// Only the first two `_`-separated parts are meaningful; anything after the
/// region is kept in the identifier but otherwise ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesId {
    id: String,
    table: String,
    region: String,
}

impl SeriesId {
    pub fn parse(raw: &str) -> Result<Self, SeriesIdError> {
        let id = raw.trim();
        let mut parts = id.split('_');
        let table = parts.next().unwrap_or_default();
        let region = parts.next().unwrap_or_default();

        if table.is_empty() || region.is_empty() {
            return Err(SeriesIdError::Malformed(raw.to_string()));
        }

        Ok(Self {
            id: id.to_string(),
            table: table.to_string(),
            region: region.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Read one identifier per line. Blank lines are skipped; duplicates are kept.
pub fn read_series_list(path: impl AsRef<Path>) -> Result<Vec<SeriesId>, SeriesIdError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| SeriesIdError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_series_list(&text)
}

pub fn parse_series_list(text: &str) -> Result<Vec<SeriesId>, SeriesIdError> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(SeriesId::parse)
        .collect()
}
