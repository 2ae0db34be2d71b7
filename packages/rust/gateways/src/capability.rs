//! Capability traits and their request/response types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GatewayError;

/// Result of a single capability call.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

// ---------------------------------------------------------------------------
// Profile search / detail
// ---------------------------------------------------------------------------

/// Identifiers to search profiles by. Only present values are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileQuery {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl ProfileQuery {
    /// True when no identifier is set.
    pub fn is_empty(&self) -> bool {
        [&self.first_name, &self.last_name, &self.company_name, &self.email]
            .iter()
            .all(|v| v.as_deref().is_none_or(|s| s.trim().is_empty()))
    }
}

/// Looks up profile candidates by identifiers.
#[async_trait]
pub trait ProfileSearch: Send + Sync {
    /// Ranked candidates. An empty result is [`GatewayError::NotFound`].
    async fn search(&self, query: &ProfileQuery) -> GatewayResult<Vec<Value>>;
}

/// Fetches the full profile behind a profile URL.
#[async_trait]
pub trait ProfileDetail: Send + Sync {
    async fn fetch(&self, profile_url: &str) -> GatewayResult<Value>;
}

// ---------------------------------------------------------------------------
// Web search
// ---------------------------------------------------------------------------

/// One organic web search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

/// Site-restricted web search.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Search `query`, restricted to `site` when non-empty. An empty list is
    /// a valid answer.
    async fn search(&self, query: &str, site: &str) -> GatewayResult<Vec<SearchHit>>;
}

// ---------------------------------------------------------------------------
// Email finder
// ---------------------------------------------------------------------------

/// The ways an email address can be looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailQuery {
    ByName {
        first: String,
        last: String,
        domain: String,
    },
    ByFullName {
        full_name: String,
        domain: String,
    },
    ByProfileUrl {
        profile_url: String,
    },
}

/// A found email and the provider's validation verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailCandidate {
    pub email: String,
    #[serde(default)]
    pub validation: Option<String>,
}

/// Finds professional email addresses.
#[async_trait]
pub trait EmailFinder: Send + Sync {
    async fn find(&self, query: &EmailQuery) -> GatewayResult<EmailCandidate>;
}
