//! Forum discussion search: refine a title, then search the forum site.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use leadenrich_gateways::{SearchHit, SerpApiClient, WebSearch};
use leadenrich_oracle::OracleAdapter;
use leadenrich_shared::{AppConfig, Result};

use crate::refine::refine_title;

/// Threads found for a title.
#[derive(Debug, Clone, Serialize)]
pub struct ForumSearchResult {
    pub refined_title: String,
    pub hits: Vec<SearchHit>,
}

pub struct ForumSearch {
    oracle: Arc<OracleAdapter>,
    web: Arc<dyn WebSearch>,
    site: String,
}

impl ForumSearch {
    pub fn new(oracle: Arc<OracleAdapter>, web: Arc<dyn WebSearch>, site: impl Into<String>) -> Self {
        Self {
            oracle,
            web,
            site: site.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(OracleAdapter::from_config(&config.oracle)?),
            Arc::new(SerpApiClient::from_config(&config.search)?),
            &config.forum.site,
        ))
    }

    #[instrument(skip_all, fields(site = %self.site))]
    pub async fn run(&self, title: &str) -> Result<ForumSearchResult> {
        let refined_title = refine_title(&self.oracle, title).await?;
        let hits = self.web.search(&refined_title, &self.site).await?;
        info!(%refined_title, hits = hits.len(), "forum search complete");
        Ok(ForumSearchResult {
            refined_title,
            hits,
        })
    }
}
