//! Reddit thread reader (OAuth2 password grant).

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use leadenrich_shared::{Credential, EnrichError, ForumConfig, Result};

/// Request timeout for token and thread calls.
const TIMEOUT: Duration = Duration::from_secs(30);

/// A thread with its top-level comments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadInfo {
    pub title: String,
    pub content: String,
    pub author: String,
    pub score: i64,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub score: i64,
}

/// The four secrets a password grant needs.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: Credential,
    pub client_secret: Credential,
    pub username: Credential,
    pub password: Credential,
}

impl RedditCredentials {
    pub fn from_config(config: &ForumConfig) -> Self {
        Self {
            client_id: Credential::env(&config.client_id_env),
            client_secret: Credential::env(&config.client_secret_env),
            username: Credential::env(&config.username_env),
            password: Credential::env(&config.password_env),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Deserialize)]
struct Thing {
    kind: String,
    data: Value,
}

#[derive(Deserialize)]
struct Post {
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    score: i64,
}

pub struct RedditClient {
    client: Client,
    token_url: String,
    api_base: String,
    credentials: RedditCredentials,
}

impl RedditClient {
    pub fn new(
        token_url: &str,
        api_base: &str,
        user_agent: &str,
        credentials: RedditCredentials,
    ) -> Result<Self> {
        for raw in [token_url, api_base] {
            Url::parse(raw)
                .map_err(|e| EnrichError::config(format!("invalid forum URL {raw:?}: {e}")))?;
        }
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| EnrichError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            token_url: token_url.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn from_config(config: &ForumConfig) -> Result<Self> {
        Self::new(
            &config.token_url,
            &config.api_base,
            &config.user_agent,
            RedditCredentials::from_config(config),
        )
    }

    /// Obtain a bearer token. All four credentials must be set.
    #[instrument(skip_all)]
    pub async fn access_token(&self) -> Result<String> {
        let c = &self.credentials;
        let client_id = c.client_id.resolve()?;
        let client_secret = c.client_secret.resolve()?;
        let username = c.username.resolve()?;
        let password = c.password.resolve()?;

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", username.as_str()),
                ("password", password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| EnrichError::Network(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::Provider {
                status: status.as_u16(),
                message: format!("failed to get access token: {status}"),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::parse(format!("unreadable token response: {e}")))?;
        match (token.access_token, token.error) {
            (Some(t), _) if !t.is_empty() => Ok(t),
            (_, error) => Err(EnrichError::Provider {
                status: status.as_u16(),
                message: format!(
                    "token endpoint returned no access token ({})",
                    error.as_deref().unwrap_or("no error given")
                ),
            }),
        }
    }

    /// Fetch a thread and its comments by URL.
    #[instrument(skip_all, fields(url = %thread_url))]
    pub async fn fetch_thread(&self, thread_url: &str) -> Result<ThreadInfo> {
        let id = thread_id_from_url(thread_url)?;
        let token = self.access_token().await?;
        let url = format!("{}/comments/{id}", self.api_base);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| EnrichError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::Provider {
                status: status.as_u16(),
                message: format!("failed to fetch thread {id}: {status}"),
            });
        }

        let listings: Vec<Listing> = response
            .json()
            .await
            .map_err(|e| EnrichError::parse(format!("unexpected thread payload: {e}")))?;
        let thread = parse_thread(listings)?;
        debug!(comments = thread.comments.len(), "thread fetched");
        Ok(thread)
    }
}

/// The thread id: the path segment right after `comments`.
pub fn thread_id_from_url(thread_url: &str) -> Result<String> {
    let url = Url::parse(thread_url.trim())
        .map_err(|e| EnrichError::validation(format!("invalid thread URL {thread_url:?}: {e}")))?;
    let mut segments = url.path_segments().into_iter().flatten();
    segments
        .by_ref()
        .find(|s| *s == "comments")
        .and_then(|_| segments.next())
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| EnrichError::validation(format!("no thread id in URL {thread_url:?}")))
}

/// First listing holds the post, the second its comments. Only `t1`
/// children are comments; `more` placeholders are skipped.
fn parse_thread(listings: Vec<Listing>) -> Result<ThreadInfo> {
    let mut listings = listings.into_iter();
    let post_thing = listings
        .next()
        .and_then(|l| l.data.children.into_iter().next())
        .ok_or_else(|| EnrichError::parse("thread payload has no post"))?;
    let post: Post = serde_json::from_value(post_thing.data)
        .map_err(|e| EnrichError::parse(format!("unexpected post shape: {e}")))?;

    let comments = listings
        .next()
        .map(|l| l.data.children)
        .unwrap_or_default()
        .into_iter()
        .filter(|thing| thing.kind == "t1")
        .filter_map(|thing| serde_json::from_value::<Comment>(thing.data).ok())
        .collect();

    Ok(ThreadInfo {
        title: post.title,
        content: post.selftext,
        author: post.author,
        score: post.score,
        comments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> RedditCredentials {
        RedditCredentials {
            client_id: Credential::Static("cid".into()),
            client_secret: Credential::Static("secret".into()),
            username: Credential::Static("bot".into()),
            password: Credential::Static("hunter2".into()),
        }
    }

    fn client(server: &MockServer, credentials: RedditCredentials) -> RedditClient {
        RedditClient::new(
            &format!("{}/api/v1/access_token", server.uri()),
            &server.uri(),
            "leadenrich-test/0.1",
            credentials,
        )
        .unwrap()
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            // base64("cid:secret")
            .and(header("authorization", "Basic Y2lkOnNlY3JldA=="))
            .and(body_string_contains("grant_type=password"))
            .and(body_string_contains("username=bot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok-123",
                "token_type": "bearer",
                "expires_in": 3600,
                "scope": "*"
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn thread_id_extraction() {
        assert_eq!(
            thread_id_from_url("https://www.reddit.com/r/rust/comments/abc123/some_title/").unwrap(),
            "abc123"
        );
        assert_eq!(
            thread_id_from_url("https://reddit.com/comments/xyz").unwrap(),
            "xyz"
        );
        assert!(matches!(
            thread_id_from_url("https://www.reddit.com/r/rust/"),
            Err(EnrichError::Validation { .. })
        ));
        assert!(thread_id_from_url("not a url").is_err());
    }

    #[tokio::test]
    async fn fetches_thread_with_comments() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/comments/abc123"))
            .and(header("authorization", "Bearer tok-123"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"kind": "Listing", "data": {"children": [
                    {"kind": "t3", "data": {"title": "Which hub?", "selftext": "Need advice", "author": "op", "score": 42}}
                ]}},
                {"kind": "Listing", "data": {"children": [
                    {"kind": "t1", "data": {"author": "a", "body": "Get the 7-in-1", "score": 10}},
                    {"kind": "t1", "data": {"author": "b", "body": "Avoid no-name ones", "score": 3}},
                    {"kind": "more", "data": {"count": 12, "children": ["x", "y"]}}
                ]}}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let thread = client(&server, credentials())
            .fetch_thread("https://www.reddit.com/r/UsbCHardware/comments/abc123/which_hub/")
            .await
            .unwrap();
        assert_eq!(thread.title, "Which hub?");
        assert_eq!(thread.content, "Need advice");
        assert_eq!(thread.score, 42);
        assert_eq!(thread.comments.len(), 2);
        assert_eq!(thread.comments[0].body, "Get the 7-in-1");
    }

    #[tokio::test]
    async fn missing_credential_fails_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut creds = credentials();
        creds.password = Credential::env("LE_TEST_NO_SUCH_REDDIT_PASSWORD");
        let err = client(&server, creds).access_token().await.unwrap_err();
        assert!(matches!(err, EnrichError::MissingCredential { ref var } if var == "LE_TEST_NO_SUCH_REDDIT_PASSWORD"));
    }

    #[tokio::test]
    async fn rejected_token_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let err = client(&server, credentials()).access_token().await.unwrap_err();
        assert!(matches!(err, EnrichError::Provider { status: 401, .. }));
    }

    #[tokio::test]
    async fn token_body_without_token_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "invalid_grant"})))
            .mount(&server)
            .await;

        let err = client(&server, credentials()).access_token().await.unwrap_err();
        assert!(err.to_string().contains("invalid_grant"));
    }
}
