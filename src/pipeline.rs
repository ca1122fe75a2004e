use indicatif::ProgressBar;
use std::path::PathBuf;
use tracing::{error, info, instrument};

use crate::fetch_error::FetchError;
use crate::fetcher::SteoFetcher;
use crate::series::SeriesId;
use crate::tables::{TableError, TablesDir};

#[derive(Debug, Default)]
pub struct FetchSummary {
    pub written: Vec<PathBuf>,
    pub failures: Vec<(SeriesId, FetchError)>,
}

impl FetchSummary {
    /// The stdout line printed for each series that could not be fetched.
    pub fn diagnostic(series_id: &SeriesId, error: &FetchError) -> String {
        format!("Failed to retrieve data for {series_id}: {error}")
    }
}

/// Fetch each series in order and write it to its region file.
///
/// A failed request is reported and skipped; a failed write aborts the run.
#[instrument(skip_all, fields(series = series.len()))]
pub async fn fetch_all(
    fetcher: &SteoFetcher,
    series: &[SeriesId],
    tables: &TablesDir,
    progress: &ProgressBar,
) -> Result<FetchSummary, TableError> {
    let mut summary = FetchSummary::default();
    progress.set_length(series.len() as u64);

    for series_id in series {
        progress.set_message(series_id.to_string());

        match fetcher.fetch_series(series_id).await {
            Ok(response) => {
                let path = tables.write_region(series_id, &response)?;
                summary.written.push(path);
            }
            Err(e) => {
                error!("Failed to fetch {}: {}", series_id, e);
                let line = FetchSummary::diagnostic(series_id, &e);
                progress.suspend(|| println!("{line}"));
                summary.failures.push((series_id.clone(), e));
            }
        }

        progress.inc(1);
    }

    progress.finish_with_message(format!(
        "✓ Fetched {} series, {} failed",
        summary.written.len(),
        summary.failures.len()
    ));
    info!(
        "Fetch complete: {} written, {} failed",
        summary.written.len(),
        summary.failures.len()
    );
    Ok(summary)
}
