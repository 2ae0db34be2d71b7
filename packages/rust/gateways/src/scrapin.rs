//! Profile search and detail backed by the Scrapin enrichment API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use leadenrich_shared::{Credential, ProviderConfig, Result};

use crate::capability::{GatewayResult, ProfileDetail, ProfileQuery, ProfileSearch};
use crate::error::GatewayError;
use crate::http;

/// Scrapin client. The key travels as the `apikey` query parameter.
pub struct ScrapinClient {
    client: Client,
    base_url: String,
    credential: Credential,
}

impl ScrapinClient {
    pub fn new(base_url: &str, credential: Credential, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http::build_client(timeout)?,
            base_url: http::base_url(base_url)?,
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

    async fn get(&self, path: &str, params: Vec<(&str, String)>) -> GatewayResult<Value> {
        let key = self.credential.resolve()?;
        let mut query = vec![("apikey", key)];
        query.extend(params);

        let body = http::send_json(
            self.client
                .get(format!("{}{path}", self.base_url))
                .query(&query),
        )
        .await?;
        require_person(body)
    }
}

/// Scrapin answers 200 with `success: false` when nothing matched.
fn require_person(body: Value) -> GatewayResult<Value> {
    let success = body.get("success").and_then(Value::as_bool).unwrap_or(true);
    let has_person = body.get("person").is_some_and(|p| !p.is_null());
    if !success || !has_person {
        let message = body
            .get("msg")
            .or_else(|| body.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("no matching profile");
        return Err(GatewayError::NotFound(message.to_string()));
    }
    Ok(body)
}

#[async_trait]
impl ProfileSearch for ScrapinClient {
    #[instrument(skip_all, fields(provider = "scrapin"))]
    async fn search(&self, query: &ProfileQuery) -> GatewayResult<Vec<Value>> {
        let params: Vec<(&str, String)> = [
            ("firstName", &query.first_name),
            ("lastName", &query.last_name),
            ("companyName", &query.company_name),
            ("email", &query.email),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.clone().map(|v| (name, v)))
        .collect();

        debug!(params = params.len(), "profile search");
        let body = self.get("/enrichment", params).await?;
        Ok(vec![body])
    }
}

#[async_trait]
impl ProfileDetail for ScrapinClient {
    #[instrument(skip_all, fields(provider = "scrapin", profile_url = %profile_url))]
    async fn fetch(&self, profile_url: &str) -> GatewayResult<Value> {
        self.get("/enrichment/profile", vec![("linkedInUrl", profile_url.to_string())])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ScrapinClient {
        ScrapinClient::new(
            &server.uri(),
            Credential::Static("scrapin-key".into()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn search_sends_only_present_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/enrichment"))
            .and(query_param("apikey", "scrapin-key"))
            .and(query_param("firstName", "Jane"))
            .and(query_param("companyName", "Acme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "person": {"firstName": "Jane", "lastName": "Doe", "headline": "CTO"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = ProfileQuery {
            first_name: Some("Jane".into()),
            company_name: Some("Acme".into()),
            ..Default::default()
        };
        let hits = client(&server).search(&query).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["person"]["headline"], "CTO");

        let received = server.received_requests().await.unwrap();
        let url = received[0].url.to_string();
        assert!(!url.contains("lastName"));
        assert!(!url.contains("email"));
    }

    #[tokio::test]
    async fn unsuccessful_body_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "msg": "Person not found"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .search(&ProfileQuery::default())
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::NotFound("Person not found".into()));
    }

    #[tokio::test]
    async fn detail_passes_profile_url() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/enrichment/profile"))
            .and(query_param("linkedInUrl", "https://www.linkedin.com/in/jdoe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "person": {"firstName": "Jane"},
                "company": {"name": "Acme", "websiteUrl": "https://acme.com"}
            })))
            .mount(&server)
            .await;

        let body = client(&server)
            .fetch("https://www.linkedin.com/in/jdoe")
            .await
            .unwrap();
        assert_eq!(body["company"]["name"], "Acme");
    }

    #[tokio::test]
    async fn provider_errors_carry_status_and_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid API key"})),
            )
            .mount(&server)
            .await;

        let err = client(&server).fetch("https://x").await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::Provider {
                status: 401,
                message: "Invalid API key".into()
            }
        );
    }

    #[tokio::test]
    async fn missing_key_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = ScrapinClient::new(
            &server.uri(),
            Credential::env("LE_TEST_NO_SUCH_SCRAPIN_KEY"),
            Duration::from_secs(5),
        )
        .unwrap();
        let err = client.fetch("https://x").await.unwrap_err();
        assert!(matches!(err, GatewayError::MissingCredential { .. }));
    }
}
