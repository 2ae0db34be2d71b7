//! Chat-completions wire types and the [`ChatModel`] transport trait.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use leadenrich_shared::{EnrichError, Result};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single chat message, in the OpenAI chat-completions shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// An assistant turn that only requests tool calls.
    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            tool_calls: calls,
            tool_call_id: None,
        }
    }

    /// The result of one tool call, sent back to the model.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.into()),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<ToolCall>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ToolCall>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

/// Name and JSON-encoded arguments of a requested function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

fn function_kind() -> String {
    "function".into()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// A tool advertised to the model.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolSpec {
    pub fn function(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            kind: "function",
            function: FunctionSpec {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Structured-output request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    JsonSchema { json_schema: JsonSchemaFormat },
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub schema: Value,
    pub strict: bool,
}

impl ResponseFormat {
    /// Ask for output matching `schema`, strictly.
    pub fn json_schema(name: impl Into<String>, schema: Value) -> Self {
        Self::JsonSchema {
            json_schema: JsonSchemaFormat {
                name: name.into(),
                schema,
                strict: true,
            },
        }
    }
}

/// Model-agnostic chat request. The transport adds the model id.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

/// The model's answer for one round trip.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub message: ChatMessage,
    pub usage: Usage,
}

// ---------------------------------------------------------------------------
// Transport trait
// ---------------------------------------------------------------------------

/// One chat-completions round trip.
///
/// Abstracts over transport (HTTP, scripted) so the adapter doesn't
/// depend on how the model is reached.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, for tracing.
    fn model_id(&self) -> &str;

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply>;
}

// ---------------------------------------------------------------------------
// Scripted model (tests)
// ---------------------------------------------------------------------------

/// Returns queued replies in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedChat {
    replies: Mutex<VecDeque<Result<ChatReply>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a final text answer.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.push(Ok(ChatReply {
            message: ChatMessage::assistant(text),
            usage: Usage::default(),
        }))
    }

    /// Queue a reply requesting one tool call.
    pub fn with_tool_call(self, tool: &str, args: Value) -> Self {
        let id = format!("call-{}", lock(&self.replies).len() + 1);
        self.push(Ok(ChatReply {
            message: ChatMessage::tool_calls(vec![ToolCall {
                id,
                kind: function_kind(),
                function: FunctionCall {
                    name: tool.to_string(),
                    arguments: args.to_string(),
                },
            }]),
            usage: Usage::default(),
        }))
    }

    /// Queue a transport failure.
    pub fn with_error(self, error: EnrichError) -> Self {
        self.push(Err(error))
    }

    fn push(self, reply: Result<ChatReply>) -> Self {
        lock(&self.replies).push_back(reply);
        self
    }

    /// Number of round trips made so far.
    pub fn calls(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Every request seen so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    fn model_id(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        lock(&self.requests).push(request.clone());
        lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| Err(EnrichError::Oracle("no scripted reply left".into())))
    }
}
