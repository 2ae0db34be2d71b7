//! Oracle invocation adapter.
//!
//! Sends a task plus the current record to an OpenAI-compatible
//! chat-completions model, lets the model call the tools bound to an
//! [`Agent`], and decodes the final answer back into an
//! [`EnrichmentRecord`](leadenrich_shared::EnrichmentRecord).
//!
//! - [`ChatModel`]: one chat round trip ([`OpenAiChat`] in production,
//!   [`ScriptedChat`] in tests)
//! - [`Agent`] / [`Tool`]: instructions and the capabilities bound to them
//! - [`OracleAdapter`]: the tool loop, decoding, and schema validation
//! - [`extract`]: fence stripping and JSON extraction from free text

mod adapter;
mod agent;
mod chat;
pub mod extract;
mod openai;
pub mod schema;

pub use adapter::OracleAdapter;
pub use agent::{Agent, Tool, tool_error};
pub use chat::{
    ChatMessage, ChatModel, ChatReply, ChatRequest, FunctionCall, FunctionSpec, JsonSchemaFormat,
    ResponseFormat, Role, ScriptedChat, ToolCall, ToolSpec, Usage,
};
pub use openai::OpenAiChat;
