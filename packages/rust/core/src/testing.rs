//! In-memory gateway doubles shared by the core tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use leadenrich_gateways::{
    EmailCandidate, EmailFinder, EmailQuery, GatewayError, GatewayResult, ProfileDetail,
    ProfileQuery, ProfileSearch, SearchHit, WebSearch,
};

/// Profile search and detail with canned answers. Empty means not found.
#[derive(Default)]
pub struct FakeProfiles {
    candidates: Vec<Value>,
    detail: Option<Value>,
    searches: AtomicUsize,
}

impl FakeProfiles {
    pub fn with_candidate(mut self, candidate: Value) -> Self {
        self.candidates.push(candidate);
        self
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn search_calls(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileSearch for FakeProfiles {
    async fn search(&self, _query: &ProfileQuery) -> GatewayResult<Vec<Value>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.candidates.is_empty() {
            return Err(GatewayError::NotFound("no matching profile".into()));
        }
        Ok(self.candidates.clone())
    }
}

#[async_trait]
impl ProfileDetail for FakeProfiles {
    async fn fetch(&self, _profile_url: &str) -> GatewayResult<Value> {
        self.detail
            .clone()
            .ok_or_else(|| GatewayError::NotFound("no such profile".into()))
    }
}

/// Web search that records `(query, site)` pairs.
#[derive(Default)]
pub struct FakeSearch {
    hits: Vec<SearchHit>,
    queries: Mutex<Vec<(String, String)>>,
}

impl FakeSearch {
    pub fn with_hit(mut self, title: &str, link: &str) -> Self {
        self.hits.push(SearchHit {
            title: title.into(),
            link: link.into(),
            snippet: String::new(),
        });
        self
    }

    pub fn queries(&self) -> Vec<(String, String)> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WebSearch for FakeSearch {
    async fn search(&self, query: &str, site: &str) -> GatewayResult<Vec<SearchHit>> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((query.to_string(), site.to_string()));
        }
        Ok(self.hits.clone())
    }
}

/// Email finder with one canned answer. Defaults to not found.
pub struct FakeEmail {
    answer: GatewayResult<EmailCandidate>,
    queries: Mutex<Vec<EmailQuery>>,
}

impl Default for FakeEmail {
    fn default() -> Self {
        Self {
            answer: Err(GatewayError::NotFound("no email found".into())),
            queries: Mutex::new(Vec::new()),
        }
    }
}

impl FakeEmail {
    pub fn finding(email: &str) -> Self {
        Self {
            answer: Ok(EmailCandidate {
                email: email.into(),
                validation: Some("valid".into()),
            }),
            ..Self::default()
        }
    }

    pub fn failing(err: GatewayError) -> Self {
        Self {
            answer: Err(err),
            ..Self::default()
        }
    }

    pub fn queries(&self) -> Vec<EmailQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EmailFinder for FakeEmail {
    async fn find(&self, query: &EmailQuery) -> GatewayResult<EmailCandidate> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }
        self.answer.clone()
    }
}
