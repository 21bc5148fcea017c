//! Plugin system for quantbot
//!
//! Capability plugins advertise a function spec consumed by the
//! assistant's reasoning engine and are dispatched by exact function
//! name through the `PluginManager`.

mod eodhd;
mod manager;
mod signal;
mod spec;

pub use eodhd::EodHdPlugin;
pub use manager::{Plugin, PluginManager};
pub use signal::SignalPlugin;
pub use spec::{FunctionSpec, ToolSpec};
