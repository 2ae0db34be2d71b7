//! HTTP plumbing shared by the provider clients.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use url::Url;

use leadenrich_shared::{EnrichError, Result};

use crate::error::GatewayError;

/// User-Agent string for provider requests.
const USER_AGENT: &str = concat!("leadenrich/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client with the given timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| EnrichError::Network(format!("failed to build HTTP client: {e}")))
}

/// Validate a configured base URL and drop any trailing slash.
pub(crate) fn base_url(raw: &str) -> Result<String> {
    Url::parse(raw).map_err(|e| EnrichError::config(format!("invalid base URL {raw:?}: {e}")))?;
    Ok(raw.trim_end_matches('/').to_string())
}

/// Send a request and decode the JSON body.
///
/// 404 maps to [`GatewayError::NotFound`], other non-success statuses to
/// [`GatewayError::Provider`]. An empty success body decodes as `null`.
pub(crate) async fn send_json(request: RequestBuilder) -> std::result::Result<Value, GatewayError> {
    // Some providers take the key as a query parameter; keep URLs out of errors.
    let response = request
        .send()
        .await
        .map_err(|e| GatewayError::Unavailable(e.without_url().to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::Unavailable(e.without_url().to_string()))?;

    if status == StatusCode::NOT_FOUND {
        return Err(GatewayError::NotFound(
            body_message(&body).unwrap_or_else(|| "resource not found".into()),
        ));
    }
    if !status.is_success() {
        return Err(GatewayError::Provider {
            status: status.as_u16(),
            message: body_message(&body).unwrap_or_else(|| status.to_string()),
        });
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).map_err(|e| GatewayError::Provider {
        status: status.as_u16(),
        message: format!("unreadable response body: {e}"),
    })
}

/// Pull a human-readable message out of an error body.
fn body_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.pointer("/error/message"))
        .or_else(|| value.get("error"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_message_variants() {
        assert_eq!(body_message(r#"{"message":"bad key"}"#).as_deref(), Some("bad key"));
        assert_eq!(
            body_message(r#"{"error":{"message":"quota"}}"#).as_deref(),
            Some("quota")
        );
        assert_eq!(body_message(r#"{"error":"Invalid API key."}"#).as_deref(), Some("Invalid API key."));
        assert_eq!(body_message("<html>"), None);
    }

    #[test]
    fn base_url_is_validated() {
        assert_eq!(base_url("https://api.scrapin.io/").unwrap(), "https://api.scrapin.io");
        assert!(matches!(base_url("not a url"), Err(EnrichError::Config { .. })));
    }
}
