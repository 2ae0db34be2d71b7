//! Agents: instructions plus the capabilities the oracle may call.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::chat::ToolSpec;

/// A capability the oracle can call during a conversation.
///
/// Failures are returned as JSON values (see [`tool_error`]) so the model
/// can read them and adjust; they never abort the conversation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Function name advertised to the model.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object.
    fn parameters(&self) -> Value;

    async fn call(&self, args: Value) -> Value;
}

/// The JSON value a tool returns when it fails.
pub fn tool_error(message: impl Into<String>, status: Option<u16>) -> Value {
    json!({
        "error": true,
        "status": status,
        "message": message.into(),
        "results": null,
    })
}

/// Instructions and bound tools for one kind of oracle task.
#[derive(Clone)]
pub struct Agent {
    name: String,
    instructions: String,
    tools: Vec<Arc<dyn Tool>>,
}

impl Agent {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tools: Vec::new(),
        }
    }

    /// Bind a tool.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Find a bound tool by function name.
    pub fn tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Tool declarations for the chat request.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|t| ToolSpec::function(t.name(), t.description(), t.parameters()))
            .collect()
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("tools", &self.tool_names())
            .finish()
    }
}
