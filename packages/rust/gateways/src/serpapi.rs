//! Web search backed by SerpApi's Google engine.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use leadenrich_shared::{Credential, ProviderConfig, Result};

use crate::capability::{GatewayResult, SearchHit, WebSearch};
use crate::error::GatewayError;
use crate::http;

/// Organic results requested per query.
const RESULTS_PER_QUERY: u32 = 10;

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<SearchHit>,
}

pub struct SerpApiClient {
    client: Client,
    endpoint: String,
    credential: Credential,
}

impl SerpApiClient {
    /// `endpoint` is the full search URL, e.g. `https://serpapi.com/search.json`.
    pub fn new(endpoint: &str, credential: Credential, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http::build_client(timeout)?,
            endpoint: http::base_url(endpoint)?,
            credential,
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            config.credential(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl WebSearch for SerpApiClient {
    #[instrument(skip_all, fields(provider = "serpapi", site = %site))]
    async fn search(&self, query: &str, site: &str) -> GatewayResult<Vec<SearchHit>> {
        let key = self.credential.resolve()?;
        let num = RESULTS_PER_QUERY.to_string();
        let mut params = vec![("engine", "google"), ("q", query), ("num", num.as_str())];
        if !site.trim().is_empty() {
            params.push(("as_sitesearch", site));
        }
        params.push(("api_key", key.as_str()));

        let body = http::send_json(self.client.get(&self.endpoint).query(&params)).await?;
        if body.is_null() {
            return Ok(Vec::new());
        }
        let parsed: SearchResponse =
            serde_json::from_value(body).map_err(|e| GatewayError::Provider {
                status: 200,
                message: format!("unexpected search payload: {e}"),
            })?;

        debug!(hits = parsed.organic_results.len(), "web search done");
        Ok(parsed.organic_results)
    }
}
