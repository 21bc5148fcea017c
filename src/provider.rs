//! EOD historical data provider client
//!
//! Thin HTTP client for the historical-data API. Daily series come back
//! as CSV with a date-indexed first column; fundamentals come back as
//! JSON. A non-success response is logged and surfaces as an empty
//! result, so callers see "no data" rather than a transport error.

use crate::error::{ProviderError, Result};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

/// Default base URL of the EOD historical data API
pub const DEFAULT_BASE_URL: &str = "https://eodhd.com/api";

/// One daily OHLCV bar from the provider's CSV
#[derive(Debug, Clone, Deserialize)]
pub struct EodBar {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: Option<f64>,
    #[serde(rename = "High")]
    pub high: Option<f64>,
    #[serde(rename = "Low")]
    pub low: Option<f64>,
    #[serde(rename = "Close")]
    pub close: Option<f64>,
    #[serde(rename = "Adjusted_close")]
    pub adjusted_close: Option<f64>,
    #[serde(rename = "Volume")]
    pub volume: Option<f64>,
}

impl EodBar {
    /// Look up a value by provider field name
    pub fn field(&self, name: &str) -> Option<f64> {
        match name {
            "Open" => self.open,
            "High" => self.high,
            "Low" => self.low,
            "Close" => self.close,
            "Adjusted_close" => self.adjusted_close,
            "Volume" => self.volume,
            _ => None,
        }
    }
}

/// A date-ordered daily series. Empty means "no data available",
/// whether from an empty range or a recovered transport failure.
#[derive(Debug, Clone, Default)]
pub struct EodTable {
    pub rows: Vec<EodBar>,
}

impl EodTable {
    /// Parse the provider's CSV body into a table
    pub fn from_csv(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for record in reader.deserialize() {
            let bar: EodBar = record.map_err(|e| ProviderError::Parse(e.to_string()))?;
            rows.push(bar);
        }
        Ok(Self { rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Resolve a lookback token to a concrete (start, end) date pair.
///
/// Accepts a literal day count ("5"), "YTD" (since Jan 1) or "MTD"
/// (since the 1st of the current month). A day count of n spans n+1
/// days back from `end`, inclusive.
pub fn resolve_range(days_back: &str, end: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    let start = match days_back {
        "YTD" => end.with_ordinal(1).expect("Jan 1 is a valid date"),
        "MTD" => end.with_day(1).expect("day 1 is a valid date"),
        token => {
            let days: i64 = token
                .parse()
                .map_err(|_| ProviderError::InvalidRange(token.to_string()))?;
            // Counts large enough to overflow the date arithmetic are
            // rejected the same way as unparseable tokens
            days.checked_add(1)
                .and_then(Duration::try_days)
                .and_then(|span| end.checked_sub_signed(span))
                .ok_or_else(|| ProviderError::InvalidRange(token.to_string()))?
        }
    };
    Ok((start, end))
}

/// HTTP client for the EOD historical data API.
///
/// Accepts an optional pre-built transport (for connection reuse and
/// tests) and an optional API token. A missing token is not validated
/// here; the provider rejects the request at execution time.
#[derive(Debug, Clone)]
pub struct EodHistoricalClient {
    base_url: String,
    client: reqwest::Client,
    api_token: Option<String>,
}

impl EodHistoricalClient {
    /// Create a new client
    pub fn new(session: Option<reqwest::Client>, api_token: Option<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client: session.unwrap_or_default(),
            api_token,
        }
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Fetch daily OHLCV bars for `symbol` on `exchange` over the
    /// resolved lookback window. `symbol` is the full provider symbol
    /// (e.g. "BTC-USD"). Returns an empty table on a non-success
    /// response or transport failure.
    pub async fn eod_series(
        &self,
        symbol: &str,
        exchange: &str,
        days_back: &str,
    ) -> Result<EodTable> {
        let (from, to) = resolve_range(days_back, Utc::now().date_naive())?;
        let url = format!("{}/eod/{}.{}", self.base_url, symbol, exchange);
        let params = [
            ("api_token", self.api_token.clone().unwrap_or_default()),
            ("from", from.format("%Y-%m-%d").to_string()),
            ("to", to.format("%Y-%m-%d").to_string()),
        ];

        debug!("Fetching EOD series for {}.{} ({} to {})", symbol, exchange, from, to);

        let response = match self.client.get(&url).query(&params).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("EOD request for {}.{} failed: {}", symbol, exchange, e);
                return Ok(EodTable::default());
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(
                "EOD request for {}.{} returned status {} ({})",
                symbol, exchange, status, url
            );
            return Ok(EodTable::default());
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        EodTable::from_csv(&body)
    }

    /// Fetch fundamentals JSON for `symbol` on `exchange`. The provider
    /// keys fundamentals by the USD pair, so "-USD" is appended here.
    /// Returns an empty object on a non-success response or transport
    /// failure.
    pub async fn fundamentals(&self, symbol: &str, exchange: &str) -> Result<serde_json::Value> {
        let url = format!("{}/fundamentals/{}-USD.{}", self.base_url, symbol, exchange);
        let params = [("api_token", self.api_token.clone().unwrap_or_default())];

        let response = match self.client.get(&url).query(&params).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Fundamentals request for {} failed: {}", symbol, e);
                return Ok(serde_json::json!({}));
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(
                "Fundamentals request for {} returned status {} ({})",
                symbol, status, url
            );
            return Ok(serde_json::json!({}));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
Date,Open,High,Low,Close,Adjusted_close,Volume
2024-03-01,100.0,105.0,99.0,104.0,104.0,1200
2024-03-02,104.0,112.0,103.0,110.0,110.0,1500
";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_range_ytd() {
        let (start, end) = resolve_range("YTD", date(2024, 3, 15)).unwrap();
        assert_eq!(start, date(2024, 1, 1));
        assert_eq!(end, date(2024, 3, 15));
    }

    #[test]
    fn test_resolve_range_mtd() {
        let (start, _) = resolve_range("MTD", date(2024, 3, 15)).unwrap();
        assert_eq!(start, date(2024, 3, 1));
    }

    #[test]
    fn test_resolve_range_day_count() {
        // A count of 5 spans 6 days back, inclusive
        let (start, _) = resolve_range("5", date(2024, 3, 15)).unwrap();
        assert_eq!(start, date(2024, 3, 9));
    }

    #[test]
    fn test_resolve_range_invalid() {
        assert!(resolve_range("soon", date(2024, 3, 15)).is_err());
    }

    #[test]
    fn test_resolve_range_out_of_range_count() {
        // Parseable counts too large for the date arithmetic are
        // rejected, not panicked on
        assert!(resolve_range("9223372036854775807", date(2024, 3, 15)).is_err());
        assert!(resolve_range("200000000000000000", date(2024, 3, 15)).is_err());
        assert!(resolve_range("-9223372036854775808", date(2024, 3, 15)).is_err());
    }

    #[test]
    fn test_table_from_csv() {
        let table = EodTable::from_csv(SAMPLE_CSV).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].date, date(2024, 3, 1));
        assert_eq!(table.rows[0].field("Close"), Some(104.0));
        assert_eq!(table.rows[1].field("Volume"), Some(1500.0));
        assert_eq!(table.rows[1].field("Bogus"), None);
    }

    #[test]
    fn test_table_from_empty_csv() {
        let table = EodTable::from_csv("").unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_eod_series_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/eod/BTC-USD.CC")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(SAMPLE_CSV)
            .create_async()
            .await;

        let client = EodHistoricalClient::new(None, Some("token".to_string()))
            .with_base_url(&server.url());
        let table = client.eod_series("BTC-USD", "CC", "5").await.unwrap();

        mock.assert_async().await;
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn test_eod_series_error_status_yields_empty_table() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/eod/BTC-USD.CC")
            .match_query(mockito::Matcher::Any)
            .with_status(403)
            .with_body("Forbidden")
            .create_async()
            .await;

        let client = EodHistoricalClient::new(None, None).with_base_url(&server.url());
        let table = client.eod_series("BTC-USD", "CC", "5").await.unwrap();

        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_eod_series_invalid_range_propagates() {
        let client = EodHistoricalClient::new(None, None);
        assert!(client.eod_series("BTC-USD", "CC", "soon").await.is_err());
    }

    #[tokio::test]
    async fn test_fundamentals() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/fundamentals/BTC-USD.CC")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"General": {"Name": "Bitcoin"}}"#)
            .create_async()
            .await;

        let client = EodHistoricalClient::new(None, None).with_base_url(&server.url());
        let value = client.fundamentals("BTC", "CC").await.unwrap();

        assert_eq!(value["General"]["Name"], "Bitcoin");
    }

    #[tokio::test]
    async fn test_fundamentals_error_status_yields_empty_object() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/fundamentals/BTC-USD.CC")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = EodHistoricalClient::new(None, None).with_base_url(&server.url());
        let value = client.fundamentals("BTC", "CC").await.unwrap();

        assert_eq!(value, serde_json::json!({}));
    }
}
