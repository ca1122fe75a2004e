// Shared fixtures for the integration tests
#![allow(dead_code)]

use calamine::{open_workbook, Data, Reader, Xlsx};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use std::path::Path;

pub const API_PATH: &str = "/v2/steo/data/";
pub const API_KEY: &str = "test-key";

/// Build a STEO response body for one series, newest period first.
pub fn steo_body(series_id: &str, description: &str, points: &[(&str, f64)]) -> String {
    let data: Vec<_> = points
        .iter()
        .map(|(period, value)| {
            json!({
                "period": period,
                "seriesId": series_id,
                "seriesDescription": description,
                "value": value,
                "unit": "million barrels per day"
            })
        })
        .collect();

    json!({
        "response": {
            "total": points.len().to_string(),
            "frequency": "monthly",
            "data": data
        }
    })
    .to_string()
}

/// Mock a successful response for `series_id`.
pub async fn mock_series(
    server: &mut ServerGuard,
    series_id: &str,
    description: &str,
    points: &[(&str, f64)],
) -> Mock {
    server
        .mock("GET", API_PATH)
        .match_query(Matcher::UrlEncoded(
            "facets[seriesId][]".into(),
            series_id.into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(steo_body(series_id, description, points))
        .create_async()
        .await
}

/// Read every cell of one sheet, row by row.
pub fn read_sheet(path: &Path, sheet: &str) -> Vec<Vec<Data>> {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("Failed to open workbook");
    let range = workbook
        .worksheet_range(sheet)
        .expect("Sheet should exist");
    range.rows().map(|row| row.to_vec()).collect()
}

pub fn sheet_names(path: &Path) -> Vec<String> {
    let workbook: Xlsx<_> = open_workbook(path).expect("Failed to open workbook");
    workbook.sheet_names()
}
