//! The oracle adapter: tool loop, answer decoding, schema validation.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use leadenrich_shared::{EnrichError, EnrichmentRecord, OracleConfig, ResponseMode, Result};

use crate::agent::{Agent, tool_error};
use crate::chat::{ChatMessage, ChatModel, ChatRequest, ResponseFormat, ToolCall};
use crate::openai::OpenAiChat;
use crate::{extract, schema};

/// Default bound on tool-call round trips per invocation.
const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;

/// Turns a task plus the current record into a new record, best effort.
pub struct OracleAdapter {
    model: Arc<dyn ChatModel>,
    mode: ResponseMode,
    max_tool_rounds: usize,
}

impl OracleAdapter {
    pub fn new(model: Arc<dyn ChatModel>, mode: ResponseMode) -> Self {
        Self {
            model,
            mode,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Build an adapter backed by [`OpenAiChat`] from the `[oracle]` section.
    pub fn from_config(config: &OracleConfig) -> Result<Self> {
        let model = OpenAiChat::from_config(config)?;
        Ok(Self::new(Arc::new(model), config.response_mode).with_max_tool_rounds(config.max_tool_rounds))
    }

    /// Ask `agent` to perform `task` on `record` and answer with a record.
    ///
    /// The answer is decoded per [`ResponseMode`] and validated against the
    /// record schema. Anything that does not validate is
    /// [`EnrichError::MalformedOracleResponse`].
    #[instrument(skip_all, fields(agent = %agent.name(), model = %self.model.model_id()))]
    pub async fn interpret(
        &self,
        agent: &Agent,
        task: &str,
        record: &EnrichmentRecord,
    ) -> Result<EnrichmentRecord> {
        let record_json = serde_json::to_string_pretty(record)
            .map_err(|e| EnrichError::parse(format!("failed to serialize record: {e}")))?;

        let system = format!(
            "{}\n\n{}",
            agent.instructions(),
            schema::shape_instructions()
        );
        let user = format!("{task}\n\nCurrent record:\n{record_json}");
        let format = self.response_format(schema::RECORD_SCHEMA_NAME, schema::record_schema());

        let text = self.converse(agent, system, user, format).await?;
        let value = self.decode(&text)?;
        schema::validate_record(&value, &text)
    }

    /// One-shot completion decoded into any deserializable type.
    #[instrument(skip_all, fields(schema = schema_name))]
    pub async fn complete_json<T: DeserializeOwned>(
        &self,
        instructions: &str,
        prompt: &str,
        schema_name: &str,
        schema: Value,
    ) -> Result<T> {
        let agent = Agent::new(schema_name, instructions);
        let system = format!(
            "{instructions}\n\nAnswer with a single JSON object matching this schema and nothing else:\n{schema}"
        );
        let format = self.response_format(schema_name, schema);

        let text = self.converse(&agent, system, prompt.to_string(), format).await?;
        let value = self.decode(&text)?;
        serde_json::from_value(value).map_err(|e| {
            EnrichError::malformed(format!("answer does not match {schema_name}: {e}"), &text)
        })
    }

    fn response_format(&self, name: &str, schema: Value) -> Option<ResponseFormat> {
        match self.mode {
            ResponseMode::Structured => Some(ResponseFormat::json_schema(name, schema)),
            ResponseMode::RawText => None,
        }
    }

    /// Decode the final answer text into JSON.
    fn decode(&self, text: &str) -> Result<Value> {
        match self.mode {
            ResponseMode::Structured => serde_json::from_str(text.trim()).map_err(|e| {
                EnrichError::malformed(format!("structured answer is not JSON: {e}"), text)
            }),
            ResponseMode::RawText => extract::parse_json_text(text),
        }
    }

    /// Run the conversation until the model answers without tool calls.
    async fn converse(
        &self,
        agent: &Agent,
        system: String,
        user: String,
        response_format: Option<ResponseFormat>,
    ) -> Result<String> {
        let mut messages = vec![ChatMessage::system(system), ChatMessage::user(user)];
        let tools = agent.specs();

        for round in 0..=self.max_tool_rounds {
            let request = ChatRequest {
                messages: messages.clone(),
                tools: tools.clone(),
                response_format: response_format.clone(),
            };
            let reply = self.model.chat(&request).await?;
            let message = reply.message;

            if message.tool_calls.is_empty() {
                return Ok(message.content.unwrap_or_default());
            }
            if round == self.max_tool_rounds {
                break;
            }

            debug!(round, calls = message.tool_calls.len(), "oracle requested tools");
            let calls = message.tool_calls.clone();
            messages.push(message);
            for call in &calls {
                let output = self.dispatch(agent, call).await;
                messages.push(ChatMessage::tool_result(&call.id, output.to_string()));
            }
        }

        Err(EnrichError::Oracle(format!(
            "agent {} exceeded {} tool rounds",
            agent.name(),
            self.max_tool_rounds
        )))
    }

    async fn dispatch(&self, agent: &Agent, call: &ToolCall) -> Value {
        let Some(tool) = agent.tool(&call.function.name) else {
            warn!(tool = %call.function.name, "oracle called an unbound tool");
            return tool_error(format!("unknown tool: {}", call.function.name), None);
        };

        let raw_args = if call.function.arguments.trim().is_empty() {
            "{}"
        } else {
            call.function.arguments.as_str()
        };
        match serde_json::from_str::<Value>(raw_args) {
            Ok(args) => tool.call(args).await,
            Err(e) => tool_error(format!("invalid tool arguments: {e}"), None),
        }
    }
}
