//! Gateway capabilities exposed to the oracle as callable tools.
//!
//! Gateway failures never escape a tool: they come back to the model as
//! an error value it can reason about.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, warn};

use leadenrich_gateways::{GatewayError, ProfileDetail, ProfileQuery, ProfileSearch, WebSearch};
use leadenrich_oracle::{Tool, tool_error};

fn recovered(tool: &str, err: &GatewayError) -> Value {
    warn!(tool, error = %err, "capability call failed");
    tool_error(err.to_string(), err.status())
}

fn nullable_string(description: &str) -> Value {
    json!({"type": ["string", "null"], "description": description})
}

// ---------------------------------------------------------------------------
// Profile search
// ---------------------------------------------------------------------------

pub struct ProfileSearchTool {
    gateway: Arc<dyn ProfileSearch>,
}

impl ProfileSearchTool {
    pub fn new(gateway: Arc<dyn ProfileSearch>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Tool for ProfileSearchTool {
    fn name(&self) -> &str {
        "profile_search"
    }

    fn description(&self) -> &str {
        "Find professional profiles by first name, last name, company name or email. \
         Returns matching profiles with their current position and company."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "firstName": nullable_string("Person's first name"),
                "lastName": nullable_string("Person's last name"),
                "companyName": nullable_string("Current company name"),
                "email": nullable_string("Known email address"),
            },
        })
    }

    async fn call(&self, args: Value) -> Value {
        let query: ProfileQuery = match serde_json::from_value(args) {
            Ok(query) => query,
            Err(e) => return tool_error(format!("invalid arguments: {e}"), None),
        };
        if query.is_empty() {
            return tool_error("provide at least one of firstName, lastName, companyName, email", None);
        }
        match self.gateway.search(&query).await {
            Ok(results) => {
                debug!(results = results.len(), "profile search answered");
                json!({"results": results})
            }
            Err(e) => recovered(self.name(), &e),
        }
    }
}

// ---------------------------------------------------------------------------
// Profile detail
// ---------------------------------------------------------------------------

pub struct ProfileDetailTool {
    gateway: Arc<dyn ProfileDetail>,
}

impl ProfileDetailTool {
    pub fn new(gateway: Arc<dyn ProfileDetail>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Tool for ProfileDetailTool {
    fn name(&self) -> &str {
        "profile_detail"
    }

    fn description(&self) -> &str {
        "Fetch the full profile behind a profile URL: name, headline, positions, \
         and the current company with its website."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {"type": "string", "description": "Profile URL"},
            },
            "required": ["url"],
        })
    }

    async fn call(&self, args: Value) -> Value {
        let Some(url) = args.get("url").and_then(Value::as_str).filter(|u| !u.trim().is_empty())
        else {
            return tool_error("missing required argument: url", None);
        };
        match self.gateway.fetch(url.trim()).await {
            Ok(profile) => json!({"results": profile}),
            Err(e) => recovered(self.name(), &e),
        }
    }
}

// ---------------------------------------------------------------------------
// Web search
// ---------------------------------------------------------------------------

/// Web search, optionally pinned to a default site.
pub struct WebSearchTool {
    gateway: Arc<dyn WebSearch>,
    default_site: Option<String>,
}

impl WebSearchTool {
    pub fn new(gateway: Arc<dyn WebSearch>) -> Self {
        Self {
            gateway,
            default_site: None,
        }
    }

    /// Restrict searches to `site` unless the model names another one.
    pub fn on_site(mut self, site: impl Into<String>) -> Self {
        self.default_site = Some(site.into());
        self
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web. Returns organic results with title, link and snippet. \
         Use `site` to restrict results to one domain."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Search query"},
                "site": nullable_string("Domain to restrict results to, e.g. linkedin.com"),
            },
            "required": ["query"],
        })
    }

    async fn call(&self, args: Value) -> Value {
        let Some(query) = args.get("query").and_then(Value::as_str).filter(|q| !q.trim().is_empty())
        else {
            return tool_error("missing required argument: query", None);
        };
        let site = args
            .get("site")
            .and_then(Value::as_str)
            .or(self.default_site.as_deref())
            .unwrap_or_default();

        match self.gateway.search(query, site).await {
            Ok(hits) => json!({"results": hits}),
            Err(e) => recovered(self.name(), &e),
        }
    }
}
