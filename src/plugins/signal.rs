//! Quantitative signal plugin
//!
//! Serves the most recent column of a precomputed composite signal
//! table: rows keyed by asset symbol, one column per period.

use super::manager::Plugin;
use super::spec::ToolSpec;
use crate::config::SignalConfig;
use crate::context::SessionContext;
use crate::error::{ProviderError, Result};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Plugin exposing quantitative research signals
pub struct SignalPlugin {
    file: PathBuf,
    source_name: String,
}

impl SignalPlugin {
    /// Create the plugin from configuration
    pub fn new(config: &SignalConfig) -> Self {
        Self {
            file: config.file.clone(),
            source_name: config.source_name.clone(),
        }
    }
}

#[async_trait]
impl Plugin for SignalPlugin {
    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::function(
            "get_crypto_asset_signal",
            "Get investment advice based on quantitative research signals. These signals \
             are represented as standard deviations. Interpret the signals as follows: 0 \
             indicates a neutral position, a signal greater than 0 suggests going long on \
             the crypto asset, while a signal less than 0 suggests going short. Signals \
             greater than 1 or less than -1 indicate a strong signal, and signals greater \
             than 2 or less than -2 indicate a very strong signal. You can request a \
             suggestion for a single crypto asset or a portfolio strategy, which involves \
             buying the top 5-10% and shorting the bottom 5-10% of assets.",
        )
    }

    async fn execute(
        &self,
        _function_name: &str,
        _session: &SessionContext,
        _args: Map<String, Value>,
    ) -> Result<Value> {
        latest_signals(&self.file)
    }
}

/// Read the signal table and return the most recent column as a
/// mapping from normalized asset symbol to signal value, sorted
/// descending. Missing entries are dropped; the "-USD" style suffix is
/// stripped from asset ids.
fn latest_signals(path: &Path) -> Result<Value> {
    let mut reader =
        csv::Reader::from_path(path).map_err(|e| ProviderError::SignalTable(e.to_string()))?;

    let latest_column = reader
        .headers()
        .map_err(|e| ProviderError::SignalTable(e.to_string()))?
        .len()
        .saturating_sub(1);

    let mut entries: Vec<(String, f64)> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ProviderError::SignalTable(e.to_string()))?;
        let Some(asset) = record.get(0) else {
            continue;
        };
        let asset = asset.split('-').next().unwrap_or(asset);

        // Non-finite cells (NaN markers) count as missing
        if let Some(value) = record
            .get(latest_column)
            .and_then(|cell| cell.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
        {
            entries.push((asset.to_string(), value));
        }
    }

    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let mut signals = Map::new();
    for (asset, value) in entries {
        signals.insert(asset, json!(value));
    }
    Ok(Value::Object(signals))
}
