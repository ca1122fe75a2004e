use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::fetch_error::FetchError;
use crate::series::SeriesId;

/// Longest slice of an error body carried into a diagnostic.
const ERROR_BODY_PREVIEW: usize = 200;

#[derive(Debug, Deserialize)]
struct Envelope {
    response: ResponseBody,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    total: Option<Value>,
    data: Vec<Map<String, Value>>,
}

/// One data point of a series, with the raw API fields kept alongside the
/// typed view so the on-disk table can reproduce every column.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    pub period: String,
    pub value: Option<f64>,
    pub series_description: Option<String>,
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesResponse {
    pub total: Option<u64>,
    pub rows: Vec<SeriesRow>,
}

impl SeriesResponse {
    /// True when the API reports more rows than a single page returned.
    pub fn is_truncated(&self) -> bool {
        self.total
            .map(|total| total > self.rows.len() as u64)
            .unwrap_or(false)
    }
}

#[derive(Clone)]
pub struct SteoFetcher {
    client: reqwest::Client,
    url: String,
    api_key: String,
    frequency: String,
    page_size: u32,
}

impl SteoFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            frequency: config.frequency.clone(),
            page_size: config.page_size,
        })
    }

    #[instrument(skip(self, series_id), fields(url = %self.url, series_id = %series_id))]
    pub async fn fetch_series(&self, series_id: &SeriesId) -> Result<SeriesResponse, FetchError> {
        let length = self.page_size.to_string();
        let query = [
            ("frequency", self.frequency.as_str()),
            ("api_key", self.api_key.as_str()),
            ("data[0]", "value"),
            ("facets[seriesId][]", series_id.as_str()),
            ("sort[0][column]", "period"),
            ("sort[0][direction]", "desc"),
            ("offset", "0"),
            ("length", length.as_str()),
        ];

        debug!("Sending HTTP request to STEO API");
        // The request URL carries the API key, so it is stripped from errors.
        let response = self
            .client
            .get(&self.url)
            .query(&query)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.without_url()))?;

        let status = response.status();
        debug!("Received HTTP response with status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Request(e.without_url()))?;

        if status.is_success() {
            debug!("Retrieved response body, size: {} bytes", body.len());
            let parsed = parse_response(&body)?;
            if parsed.rows.is_empty() {
                return Err(FetchError::NoData(format!(
                    "{series_id} returned no rows"
                )));
            }
            if parsed.is_truncated() {
                warn!(
                    "Series {} has {} rows but only {} were returned; older periods are dropped",
                    series_id,
                    parsed.total.unwrap_or_default(),
                    parsed.rows.len()
                );
            }
            Ok(parsed)
        } else if status.as_u16() == 404 {
            Err(FetchError::NotFound(format!(
                "{series_id} not found on server"
            )))
        } else if status.is_server_error() {
            Err(FetchError::ServerError(format!(
                "Server error {status} while fetching {series_id}"
            )))
        } else {
            Err(FetchError::Rejected {
                status: status.as_u16(),
                message: body.chars().take(ERROR_BODY_PREVIEW).collect(),
            })
        }
    }
}

/// Decode a STEO response body into typed rows.
pub fn parse_response(body: &str) -> Result<SeriesResponse, FetchError> {
    let envelope: Envelope = serde_json::from_str(body)?;

    let total = envelope.response.total.as_ref().and_then(total_rows);
    let rows = envelope
        .response
        .data
        .into_iter()
        .enumerate()
        .map(|(row, fields)| parse_row(row, fields))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Parsed {} rows (total reported: {:?})", rows.len(), total);
    Ok(SeriesResponse { total, rows })
}

fn parse_row(row: usize, fields: Map<String, Value>) -> Result<SeriesRow, FetchError> {
    let period = match fields.get("period") {
        Some(Value::String(period)) if !period.trim().is_empty() => period.clone(),
        Some(other) => {
            return Err(FetchError::InvalidPayload {
                row,
                msg: format!("period must be a non-empty string, got {other}"),
            })
        }
        None => {
            return Err(FetchError::InvalidPayload {
                row,
                msg: "missing period".to_string(),
            })
        }
    };

    let value = match fields.get("value") {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => {
            let parsed = s.trim().parse::<f64>().map_err(|e| FetchError::InvalidPayload {
                row,
                msg: format!("value {s:?} is not numeric: {e}"),
            })?;
            parsed.is_finite().then_some(parsed)
        }
        Some(other) => {
            return Err(FetchError::InvalidPayload {
                row,
                msg: format!("value must be numeric, got {other}"),
            })
        }
    };

    let series_description = match fields.get("seriesDescription") {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    };

    Ok(SeriesRow {
        period,
        value,
        series_description,
        fields,
    })
}

// EIA reports `total` as either a number or a numeric string.
fn total_rows(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Render a raw field the way it is stored in a region table cell.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
