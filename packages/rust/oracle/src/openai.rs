//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use leadenrich_shared::{Credential, EnrichError, OracleConfig, Result};

use crate::chat::{ChatMessage, ChatModel, ChatReply, ChatRequest, Usage};

/// User-Agent string for oracle requests.
const USER_AGENT: &str = concat!("leadenrich/", env!("CARGO_PKG_VERSION"));

/// Request body: the model id plus the model-agnostic request.
#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    #[serde(flatten)]
    request: &'a ChatRequest,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: ChatMessage,
}

/// Chat model reached over HTTP at `{base_url}/chat/completions`.
pub struct OpenAiChat {
    client: Client,
    base_url: String,
    model: String,
    credential: Credential,
}

impl OpenAiChat {
    /// Create a client for `model` at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        credential: Credential,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| EnrichError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            credential,
        })
    }

    /// Create a client from the `[oracle]` config section.
    pub fn from_config(config: &OracleConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            &config.model,
            Credential::env(&config.api_key_env),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    fn model_id(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model, messages = request.messages.len()))]
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        // Fail before touching the network when the key is absent.
        let api_key = self.credential.resolve()?;
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&WireRequest {
                model: &self.model,
                request,
            })
            .send()
            .await
            .map_err(|e| EnrichError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EnrichError::Network(format!("{url}: failed to read body: {e}")))?;

        if !status.is_success() {
            return Err(EnrichError::Provider {
                status: status.as_u16(),
                message: error_message(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        let parsed: WireResponse = serde_json::from_str(&body)
            .map_err(|e| EnrichError::Oracle(format!("unreadable completion: {e}")))?;

        let usage = parsed.usage.unwrap_or_default();
        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| EnrichError::Oracle("completion has no choices".into()))?;

        debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            tool_calls = message.tool_calls.len(),
            "chat completion received"
        );

        Ok(ChatReply { message, usage })
    }
}

/// Pull `error.message` (or a top-level `message`) out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .or_else(|| value.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_owned)
}
