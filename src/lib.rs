//! quantbot - plugin registry and dispatch for a financial assistant
//!
//! This crate is the extension layer of a conversational assistant: it
//! lets the assistant's reasoning engine invoke named tools (historical
//! price lookups, quantitative signal retrieval) through a uniform
//! calling convention and routes each invocation to the plugin that
//! implements it.
//!
//! The [`PluginManager`] builds the active plugin set from
//! configuration, aggregates function specs for the reasoning engine,
//! resolves a call by exact function name, marshals JSON arguments into
//! a native invocation, and serializes the result (or a structured
//! error) back to the caller.
//!
//! ```no_run
//! use quantbot::{Config, PluginManager, SessionContext};
//!
//! # async fn run() -> quantbot::Result<()> {
//! let config = Config::load(None)?;
//! let manager = PluginManager::new(&config);
//!
//! // Advertised to the reasoning engine before every turn
//! let _specs = manager.get_functions_specs();
//!
//! // Dispatch a tool call selected by the engine
//! let session = SessionContext::new().with_user("alice");
//! let reply = manager
//!     .call_function("get_crypto_asset_signal", &session, "{}")
//!     .await?;
//! println!("{}", reply);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod plugins;
pub mod provider;

pub use config::Config;
pub use context::SessionContext;
pub use error::{BotError, Result};
pub use plugins::{EodHdPlugin, Plugin, PluginManager, SignalPlugin, ToolSpec};
pub use provider::EodHistoricalClient;
