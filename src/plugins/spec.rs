//! Function spec definitions
//!
//! Defines the wire shape advertised to the reasoning engine's
//! tool-calling protocol: `{"type": "function", "function": {...}}`.
//! Field names are contractual and must not change.

use serde::{Deserialize, Serialize};

/// A callable capability advertised to the reasoning engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSpec {
    /// Always "function"
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSpec,
}

/// Descriptor of a single callable function
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionSpec {
    /// Globally unique name across active plugins
    pub name: String,
    /// Free-text semantics used by the engine to decide what to call
    pub description: String,
    /// JSON-schema style argument description; omitted when the
    /// function takes no arguments. Advisory only, not enforced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

impl ToolSpec {
    /// Create a parameterless function spec
    pub fn function(name: &str, description: &str) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionSpec {
                name: name.to_string(),
                description: description.to_string(),
                parameters: None,
            },
        }
    }

    /// Attach an argument schema
    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.function.parameters = Some(parameters);
        self
    }

    /// The advertised function name
    pub fn name(&self) -> &str {
        &self.function.name
    }
}
