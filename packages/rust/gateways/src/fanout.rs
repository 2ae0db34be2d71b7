//! Concurrent profile search across several providers.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

use crate::capability::{GatewayResult, ProfileQuery, ProfileSearch};
use crate::error::GatewayError;

/// Queries every provider at once and concatenates their candidates in
/// provider order. Fails only when every provider failed.
pub struct FanoutProfileSearch {
    providers: Vec<Arc<dyn ProfileSearch>>,
}

impl FanoutProfileSearch {
    pub fn new(providers: Vec<Arc<dyn ProfileSearch>>) -> Self {
        Self { providers }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl ProfileSearch for FanoutProfileSearch {
    #[instrument(skip_all, fields(providers = self.providers.len()))]
    async fn search(&self, query: &ProfileQuery) -> GatewayResult<Vec<Value>> {
        let mut tasks = JoinSet::new();
        for (index, provider) in self.providers.iter().enumerate() {
            let provider = Arc::clone(provider);
            let query = query.clone();
            tasks.spawn(async move { (index, provider.search(&query).await) });
        }

        let mut outcomes: Vec<Option<GatewayResult<Vec<Value>>>> =
            (0..self.providers.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(e) => warn!(error = %e, "profile search task failed"),
            }
        }

        let mut candidates = Vec::new();
        let mut errors = Vec::new();
        for outcome in outcomes {
            match outcome {
                Some(Ok(hits)) => candidates.extend(hits),
                Some(Err(e)) => errors.push(e),
                None => errors.push(GatewayError::Unavailable("profile search task failed".into())),
            }
        }

        if !candidates.is_empty() {
            debug!(candidates = candidates.len(), failed = errors.len(), "fan-out joined");
            return Ok(candidates);
        }
        Err(pick_error(errors))
    }
}

/// `NotFound` only when every provider reported not-found; otherwise the
/// first real failure.
fn pick_error(errors: Vec<GatewayError>) -> GatewayError {
    if errors.iter().all(GatewayError::is_not_found) {
        return errors
            .into_iter()
            .next()
            .unwrap_or_else(|| GatewayError::NotFound("no profile providers configured".into()));
    }
    errors
        .into_iter()
        .find(|e| !e.is_not_found())
        .unwrap_or_else(|| GatewayError::Unavailable("profile search failed".into()))
}
