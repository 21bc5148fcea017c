//! Historical price plugin
//!
//! Fetches daily OHLCV series from the EOD historical data provider
//! and derives window analytics over the requested fields.

use super::manager::Plugin;
use super::spec::ToolSpec;
use crate::config::Config;
use crate::context::SessionContext;
use crate::error::{BotError, Result};
use crate::provider::{EodHistoricalClient, EodTable};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::time::Duration;

const ALL_ANALYTICS: [&str; 4] = ["highest", "lowest", "average", "return"];

/// Plugin exposing historical prices and window analytics
pub struct EodHdPlugin {
    client: EodHistoricalClient,
    exchange: String,
}

impl EodHdPlugin {
    /// Create the plugin from configuration. A missing API token is
    /// tolerated here; provider calls fail downstream instead.
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.provider.timeout))
            .build()
            .expect("Failed to create HTTP client");

        let client = EodHistoricalClient::new(Some(http), config.api_key())
            .with_base_url(&config.provider.base_url);

        Self {
            client,
            exchange: config.provider.exchange.clone(),
        }
    }

    /// Create the plugin around an existing provider client
    pub fn with_client(client: EodHistoricalClient, exchange: &str) -> Self {
        Self {
            client,
            exchange: exchange.to_string(),
        }
    }
}

#[async_trait]
impl Plugin for EodHdPlugin {
    fn source_name(&self) -> &str {
        "EODHD APIs"
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::function(
            "get_historical_price_and_analytics",
            "Retrieve the historical data and perform analytics for a specified \
             cryptocurrency within a given time range.",
        )
        .with_parameters(json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "The symbol of the cryptocurrency (e.g., BTC for Bitcoin, \
                                    ETH for Ethereum). Convert the currency name in the request \
                                    to its symbol.",
                },
                "fields": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "A list of requested data fields for the specified symbol. \
                                    Available options are ['Open', 'High', 'Low', 'Close', \
                                    'Volume']. Use 'Close' for historical end-of-day prices. \
                                    The default value is ['Close']",
                },
                "days_back": {
                    "type": "string",
                    "description": "The number of days of historical data to retrieve. This is \
                                    usually a number (as a string) but can also be 'MTD' (Month \
                                    to Date) or 'YTD' (Year to Date).",
                },
                "analytics": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "A list of analytics to perform on the historical data. Valid \
                                    values are ['highest', 'lowest', 'average', 'return']. The \
                                    default value is the full list",
                },
            },
            "required": ["symbol", "days_back", "fields", "analytics"],
        }))
    }

    async fn execute(
        &self,
        _function_name: &str,
        _session: &SessionContext,
        args: Map<String, Value>,
    ) -> Result<Value> {
        let symbol = require_str(&args, "symbol")?;
        let days_back = require_str(&args, "days_back")?;
        let fields = str_array(&args, "fields").unwrap_or_else(|| vec!["Close".to_string()]);
        let analytics = str_array(&args, "analytics").unwrap_or_default();

        let table = self
            .client
            .eod_series(&format!("{}-USD", symbol), &self.exchange, days_back)
            .await?;

        Ok(json!({
            "data": series_data(&table, &fields),
            "analytics": series_analytics(&table, &fields, &analytics),
        }))
    }
}

fn require_str<'a>(args: &'a Map<String, Value>, name: &str) -> Result<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| BotError::Execution(format!("missing required argument '{}'", name)))
}

fn str_array(args: &Map<String, Value>, name: &str) -> Option<Vec<String>> {
    args.get(name).and_then(Value::as_array).map(|values| {
        values
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}

/// Date-indexed values restricted to the requested fields
fn series_data(table: &EodTable, fields: &[String]) -> Value {
    let mut data = Map::new();
    for field in fields {
        let mut series = Map::new();
        for bar in &table.rows {
            if let Some(value) = bar.field(field) {
                series.insert(bar.date.format("%Y-%m-%d").to_string(), json!(value));
            }
        }
        data.insert(field.clone(), Value::Object(series));
    }
    Value::Object(data)
}

/// Requested window analytics per field. An empty request means all
/// four; unknown analytic names are ignored.
fn series_analytics(table: &EodTable, fields: &[String], requested: &[String]) -> Value {
    let mut analytics = Map::new();
    for name in ALL_ANALYTICS {
        if !requested.is_empty() && !requested.iter().any(|r| r == name) {
            continue;
        }

        let mut per_field = Map::new();
        for field in fields {
            let values: Vec<f64> = table.rows.iter().filter_map(|bar| bar.field(field)).collect();
            let value = match name {
                "highest" => values.iter().cloned().reduce(f64::max),
                "lowest" => values.iter().cloned().reduce(f64::min),
                "average" => {
                    if values.is_empty() {
                        None
                    } else {
                        Some(values.iter().sum::<f64>() / values.len() as f64)
                    }
                }
                // Percentage change from first to last row in the window
                "return" => match (values.first(), values.last()) {
                    (Some(first), Some(last)) => Some((last - first) * 100.0 / first),
                    _ => None,
                },
                _ => None,
            };
            per_field.insert(field.clone(), value.map_or(Value::Null, |v| json!(v)));
        }
        analytics.insert(name.to_string(), Value::Object(per_field));
    }
    Value::Object(analytics)
}
