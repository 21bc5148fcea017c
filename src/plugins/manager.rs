//! Plugin registry and dispatcher
//!
//! Builds the active plugin set from configuration, aggregates function
//! specs for the reasoning engine, and routes each call to the plugin
//! owning the requested function name.

use super::eodhd::EodHdPlugin;
use super::signal::SignalPlugin;
use super::spec::ToolSpec;
use crate::config::Config;
use crate::context::SessionContext;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// A self-contained capability unit.
///
/// `spec` must be pure and is queried before every reasoning turn.
/// `execute` receives the originally requested function name so a
/// plugin advertising several functions can branch on it, plus the
/// session context passed through unmodified from the caller.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Stable provenance label for attribution
    fn source_name(&self) -> &str;

    /// The function spec advertised to the reasoning engine
    fn spec(&self) -> ToolSpec;

    /// Perform the capability with already-decoded arguments
    async fn execute(
        &self,
        function_name: &str,
        session: &SessionContext,
        args: Map<String, Value>,
    ) -> Result<Value>;
}

/// Registry of active plugins, fixed after construction.
///
/// Holds no mutable shared state, so concurrent dispatch to different
/// plugins is safe by construction.
pub struct PluginManager {
    plugins: Vec<Box<dyn Plugin>>,
    functions: HashMap<String, usize>,
}

impl PluginManager {
    /// Build the active plugin set from configuration.
    ///
    /// One plugin is instantiated per recognized key, preserving the
    /// configuration's order. Unrecognized keys are skipped with a log
    /// line so configs may list plugins this binary does not implement.
    pub fn new(config: &Config) -> Self {
        let mut plugins: Vec<Box<dyn Plugin>> = Vec::new();

        for key in &config.plugins {
            let plugin: Option<Box<dyn Plugin>> = match key.as_str() {
                "eodhd" => Some(Box::new(EodHdPlugin::new(config))),
                "signals" => Some(Box::new(SignalPlugin::new(&config.signals))),
                _ => None,
            };

            match plugin {
                Some(plugin) => {
                    info!("Activated plugin '{}'", key);
                    plugins.push(plugin);
                }
                None => debug!("Skipping unrecognized plugin key '{}'", key),
            }
        }

        Self::from_plugins(plugins)
    }

    /// Build a registry from pre-constructed plugins, preserving order.
    /// Duplicate function names are logged; the first registrant wins.
    pub fn from_plugins(plugins: Vec<Box<dyn Plugin>>) -> Self {
        let mut functions = HashMap::new();

        for (index, plugin) in plugins.iter().enumerate() {
            let name = plugin.spec().function.name;
            if functions.contains_key(&name) {
                warn!(
                    "Duplicate function name '{}' from '{}'; keeping the first registrant",
                    name,
                    plugin.source_name()
                );
                continue;
            }
            functions.insert(name, index);
        }

        Self { plugins, functions }
    }

    /// One spec per active plugin, in construction order
    pub fn get_functions_specs(&self) -> Vec<ToolSpec> {
        self.plugins.iter().map(|plugin| plugin.spec()).collect()
    }

    /// Dispatch a call to the plugin owning `function_name`.
    ///
    /// An unknown function name is a recoverable condition reported as
    /// a serialized `{"error": ...}` payload. Argument-decoding and
    /// execution failures propagate to the caller; the reasoning loop
    /// reissues the call if it wants a retry.
    pub async fn call_function(
        &self,
        function_name: &str,
        session: &SessionContext,
        arguments: &str,
    ) -> Result<String> {
        let Some(plugin) = self.plugin_for(function_name) else {
            return Ok(
                json!({"error": format!("Function {} not found", function_name)}).to_string(),
            );
        };

        let args: Map<String, Value> = serde_json::from_str(arguments)?;
        let result = plugin.execute(function_name, session, args).await?;
        Ok(serde_json::to_string(&result)?)
    }

    /// Source label of the plugin owning `function_name`, or an empty
    /// string if no plugin matches. Used for transcript attribution.
    pub fn get_plugin_source_name(&self, function_name: &str) -> String {
        self.plugin_for(function_name)
            .map(|plugin| plugin.source_name().to_string())
            .unwrap_or_default()
    }

    fn plugin_for(&self, function_name: &str) -> Option<&dyn Plugin> {
        self.functions
            .get(function_name)
            .map(|&index| self.plugins[index].as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    /// Minimal plugin echoing its inputs back
    struct StubPlugin {
        name: String,
        source: String,
    }

    impl StubPlugin {
        fn boxed(name: &str, source: &str) -> Box<dyn Plugin> {
            Box::new(Self {
                name: name.to_string(),
                source: source.to_string(),
            })
        }
    }

    #[async_trait]
    impl Plugin for StubPlugin {
        fn source_name(&self) -> &str {
            &self.source
        }

        fn spec(&self) -> ToolSpec {
            ToolSpec::function(&self.name, "stub")
        }

        async fn execute(
            &self,
            function_name: &str,
            _session: &SessionContext,
            args: Map<String, Value>,
        ) -> Result<Value> {
            Ok(json!({
                "source": self.source,
                "function": function_name,
                "args": args,
            }))
        }
    }

    #[test]
    fn test_construction_preserves_order_and_filters() {
        let mut config = Config::default();
        config.plugins = vec![
            "signals".to_string(),
            "wolfram".to_string(),
            "eodhd".to_string(),
        ];

        let manager = PluginManager::new(&config);
        let specs = manager.get_functions_specs();

        let names: Vec<&str> = specs.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["get_crypto_asset_signal", "get_historical_price_and_analytics"]
        );
    }

    #[test]
    fn test_specs_idempotent() {
        let manager = PluginManager::new(&Config::default());
        assert_eq!(manager.get_functions_specs(), manager.get_functions_specs());
    }

    #[tokio::test]
    async fn test_dispatch_by_exact_name() {
        let manager = PluginManager::from_plugins(vec![
            StubPlugin::boxed("get_alpha", "alpha source"),
            StubPlugin::boxed("get_beta", "beta source"),
        ]);
        let session = SessionContext::new();

        let reply = manager
            .call_function("get_beta", &session, r#"{"symbol": "BTC"}"#)
            .await
            .unwrap();
        let reply: Value = serde_json::from_str(&reply).unwrap();

        assert_eq!(reply["source"], "beta source");
        assert_eq!(reply["function"], "get_beta");
        assert_eq!(reply["args"]["symbol"], "BTC");
    }

    #[tokio::test]
    async fn test_unknown_function_reports_error_payload() {
        let manager = PluginManager::from_plugins(vec![StubPlugin::boxed("get_alpha", "alpha")]);
        let session = SessionContext::new();

        let reply = manager
            .call_function("get_weather", &session, "{}")
            .await
            .unwrap();

        assert_eq!(reply, r#"{"error":"Function get_weather not found"}"#);
        assert_eq!(manager.get_plugin_source_name("get_weather"), "");
    }

    #[tokio::test]
    async fn test_malformed_arguments_propagate() {
        let manager = PluginManager::from_plugins(vec![StubPlugin::boxed("get_alpha", "alpha")]);
        let session = SessionContext::new();

        let result = manager
            .call_function("get_alpha", &session, "not json")
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_name_first_registrant_wins() {
        let manager = PluginManager::from_plugins(vec![
            StubPlugin::boxed("get_alpha", "first"),
            StubPlugin::boxed("get_alpha", "second"),
        ]);
        let session = SessionContext::new();

        assert_eq!(manager.get_plugin_source_name("get_alpha"), "first");

        let reply = manager
            .call_function("get_alpha", &session, "{}")
            .await
            .unwrap();
        let reply: Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(reply["source"], "first");
    }

    #[test]
    fn test_source_name_lookup() {
        let manager = PluginManager::from_plugins(vec![
            StubPlugin::boxed("get_alpha", "alpha source"),
            StubPlugin::boxed("get_beta", "beta source"),
        ]);

        assert_eq!(manager.get_plugin_source_name("get_alpha"), "alpha source");
        assert_eq!(manager.get_plugin_source_name("get_beta"), "beta source");
    }
}
