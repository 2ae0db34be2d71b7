//! Email lookup backed by Anymail Finder.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use leadenrich_shared::{Credential, ProviderConfig, Result};

use crate::capability::{EmailCandidate, EmailFinder, EmailQuery, GatewayResult};
use crate::error::GatewayError;
use crate::http;

pub struct AnymailFinderClient {
    client: Client,
    base_url: String,
    credential: Credential,
}

impl AnymailFinderClient {
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
}

/// Endpoint path and JSON body for a query.
fn request_for(query: &EmailQuery) -> (&'static str, Value) {
    match query {
        EmailQuery::ByName {
            first,
            last,
            domain,
        } => (
            "/search/person.json",
            json!({"first_name": first, "last_name": last, "domain": domain}),
        ),
        EmailQuery::ByFullName { full_name, domain } => (
            "/search/person.json",
            json!({"full_name": full_name, "domain": domain}),
        ),
        EmailQuery::ByProfileUrl { profile_url } => (
            "/search/linkedin-url.json",
            json!({"linkedin_url": profile_url}),
        ),
    }
}

#[async_trait]
impl EmailFinder for AnymailFinderClient {
    #[instrument(skip_all, fields(provider = "anymailfinder"))]
    async fn find(&self, query: &EmailQuery) -> GatewayResult<EmailCandidate> {
        let key = self.credential.resolve()?;
        let (path, body) = request_for(query);

        let response = http::send_json(
            self.client
                .post(format!("{}{path}", self.base_url))
                .bearer_auth(key)
                .json(&body),
        )
        .await?;

        let results = response.get("results").unwrap_or(&Value::Null);
        let Some(email) = results.get("email").and_then(Value::as_str) else {
            return Err(GatewayError::NotFound("no email found".into()));
        };
        let validation = results
            .get("validation")
            .and_then(Value::as_str)
            .map(str::to_owned);

        debug!(validation = validation.as_deref().unwrap_or("unknown"), "email found");
        Ok(EmailCandidate {
            email: email.to_string(),
            validation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> AnymailFinderClient {
        AnymailFinderClient::new(
            &server.uri(),
            Credential::Static("amf-key".into()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn by_name_posts_person_search() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search/person.json"))
            .and(header("authorization", "Bearer amf-key"))
            .and(body_json(json!({"first_name": "Jane", "last_name": "Doe", "domain": "acme.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": {"email": "jane@acme.com", "validation": "valid"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let found = client(&server)
            .find(&EmailQuery::ByName {
                first: "Jane".into(),
                last: "Doe".into(),
                domain: "acme.com".into(),
            })
            .await
            .unwrap();
        assert_eq!(found.email, "jane@acme.com");
        assert_eq!(found.validation.as_deref(), Some("valid"));
    }

    #[tokio::test]
    async fn by_profile_url_uses_linkedin_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search/linkedin-url.json"))
            .and(body_json(json!({"linkedin_url": "https://www.linkedin.com/in/jdoe"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": {"email": "jdoe@acme.com"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let found = client(&server)
            .find(&EmailQuery::ByProfileUrl {
                profile_url: "https://www.linkedin.com/in/jdoe".into(),
            })
            .await
            .unwrap();
        assert_eq!(found.email, "jdoe@acme.com");
        assert_eq!(found.validation, None);
    }

    #[tokio::test]
    async fn null_email_and_404_are_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search/person.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": {"email": null, "validation": null}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/search/linkedin-url.json"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found"})))
            .mount(&server)
            .await;

        let client = client(&server);
        let err = client
            .find(&EmailQuery::ByFullName {
                full_name: "Jane Doe".into(),
                domain: "acme.com".into(),
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = client
            .find(&EmailQuery::ByProfileUrl {
                profile_url: "https://x".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::NotFound("Not found".into()));
    }
}
