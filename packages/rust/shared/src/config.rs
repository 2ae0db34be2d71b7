//! Application configuration for leadenrich.
//!
//! User config lives at `~/.leadenrich/leadenrich.toml`.
//! CLI flags override config file values, which override defaults.
//! The file only ever names environment variables; secrets are read from
//! the environment at call time.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EnrichError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "leadenrich.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".leadenrich";

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// A required secret could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing credential {var}")]
pub struct MissingCredential {
    /// Name of the environment variable (or `<static>` for inline secrets).
    pub var: String,
}

/// Where a secret comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Read from this environment variable on every call.
    Env(String),
    /// A fixed value, used by tests and embedders.
    Static(String),
}

impl Credential {
    /// Credential read from the named environment variable.
    pub fn env(var: impl Into<String>) -> Self {
        Self::Env(var.into())
    }

    /// Resolve the secret. Empty values count as missing.
    pub fn resolve(&self) -> std::result::Result<String, MissingCredential> {
        match self {
            Self::Env(var) => match std::env::var(var) {
                Ok(val) if !val.trim().is_empty() => Ok(val),
                _ => Err(MissingCredential { var: var.clone() }),
            },
            Self::Static(val) if !val.trim().is_empty() => Ok(val.clone()),
            Self::Static(_) => Err(MissingCredential {
                var: "<static>".into(),
            }),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env(var) => f.debug_tuple("Env").field(var).finish(),
            Self::Static(_) => f.write_str("Static(***)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Config structs (matching leadenrich.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Reasoning oracle settings.
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Profile search / detail provider.
    #[serde(default = "default_profiles")]
    pub profiles: ProviderConfig,

    /// Web search provider.
    #[serde(default = "default_search")]
    pub search: ProviderConfig,

    /// Email discovery provider.
    #[serde(default = "default_email")]
    pub email: ProviderConfig,

    /// Discussion-forum pipeline.
    #[serde(default)]
    pub forum: ForumConfig,

    /// Orchestration settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            oracle: OracleConfig::default(),
            profiles: default_profiles(),
            search: default_search(),
            email: default_email(),
            forum: ForumConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

/// How the oracle's final answer is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// The request carries a JSON schema and the answer is plain JSON.
    Structured,
    /// The answer is free text, possibly wrapped in a fenced code block.
    RawText,
}

/// `[oracle]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_oracle_key_env")]
    pub api_key_env: String,

    /// OpenAI-compatible API root.
    #[serde(default = "default_oracle_base_url")]
    pub base_url: String,

    /// Model used for every stage.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_response_mode")]
    pub response_mode: ResponseMode,

    /// Upper bound on tool-call round trips per oracle invocation.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,

    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_oracle_key_env(),
            base_url: default_oracle_base_url(),
            model: default_model(),
            response_mode: default_response_mode(),
            max_tool_rounds: default_max_tool_rounds(),
            timeout_secs: default_oracle_timeout(),
        }
    }
}

fn default_oracle_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_oracle_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_response_mode() -> ResponseMode {
    ResponseMode::Structured
}
fn default_max_tool_rounds() -> usize {
    8
}
fn default_oracle_timeout() -> u64 {
    60
}

/// `[profiles]`, `[search]` and `[email]` sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Name of the env var holding the provider API key.
    pub api_key_env: String,
    /// Provider API root.
    pub base_url: String,
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Credential backed by [`ProviderConfig::api_key_env`].
    pub fn credential(&self) -> Credential {
        Credential::env(&self.api_key_env)
    }
}

fn default_provider_timeout() -> u64 {
    30
}
fn default_profiles() -> ProviderConfig {
    ProviderConfig {
        api_key_env: "SCRAPIN_API_KEY".into(),
        base_url: "https://api.scrapin.io".into(),
        timeout_secs: default_provider_timeout(),
    }
}
fn default_search() -> ProviderConfig {
    ProviderConfig {
        api_key_env: "SERPAPI_API_KEY".into(),
        base_url: "https://serpapi.com/search.json".into(),
        timeout_secs: default_provider_timeout(),
    }
}
fn default_email() -> ProviderConfig {
    ProviderConfig {
        api_key_env: "ANYMAILFINDER_API_KEY".into(),
        base_url: "https://api.anymailfinder.com/v5.0".into(),
        timeout_secs: default_provider_timeout(),
    }
}

/// `[forum]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumConfig {
    #[serde(default = "default_client_id_env")]
    pub client_id_env: String,
    #[serde(default = "default_client_secret_env")]
    pub client_secret_env: String,
    #[serde(default = "default_username_env")]
    pub username_env: String,
    #[serde(default = "default_password_env")]
    pub password_env: String,

    /// OAuth2 token endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Authenticated API root.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Site the forum search is restricted to.
    #[serde(default = "default_site")]
    pub site: String,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            client_id_env: default_client_id_env(),
            client_secret_env: default_client_secret_env(),
            username_env: default_username_env(),
            password_env: default_password_env(),
            token_url: default_token_url(),
            api_base: default_api_base(),
            user_agent: default_user_agent(),
            site: default_site(),
        }
    }
}

fn default_client_id_env() -> String {
    "REDDIT_CLIENT_ID".into()
}
fn default_client_secret_env() -> String {
    "REDDIT_SECRET".into()
}
fn default_username_env() -> String {
    "REDDIT_USERNAME".into()
}
fn default_password_env() -> String {
    "REDDIT_PASSWORD".into()
}
fn default_token_url() -> String {
    "https://www.reddit.com/api/v1/access_token".into()
}
fn default_api_base() -> String {
    "https://oauth.reddit.com".into()
}
fn default_user_agent() -> String {
    concat!("leadenrich/", env!("CARGO_PKG_VERSION")).into()
}
fn default_site() -> String {
    "reddit.com".into()
}

/// When a stage may skip its external work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShortCircuit {
    /// Skip when every field the stage owns is present.
    TargetFields,
    /// Skip only when the whole record is full.
    FullRecord,
}

/// `[pipeline.short_circuit]` section: one policy per stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortCircuitConfig {
    #[serde(default = "target_fields")]
    pub profile_url_discovery: ShortCircuit,
    #[serde(default = "full_record")]
    pub profile_detail: ShortCircuit,
    #[serde(default = "full_record")]
    pub sparse_strategy: ShortCircuit,
    #[serde(default = "full_record")]
    pub company_identification: ShortCircuit,
    #[serde(default = "full_record")]
    pub company_detail: ShortCircuit,
    #[serde(default = "target_fields")]
    pub email_discovery: ShortCircuit,
}

impl Default for ShortCircuitConfig {
    fn default() -> Self {
        Self {
            profile_url_discovery: ShortCircuit::TargetFields,
            profile_detail: ShortCircuit::FullRecord,
            sparse_strategy: ShortCircuit::FullRecord,
            company_identification: ShortCircuit::FullRecord,
            company_detail: ShortCircuit::FullRecord,
            email_discovery: ShortCircuit::TargetFields,
        }
    }
}

fn target_fields() -> ShortCircuit {
    ShortCircuit::TargetFields
}
fn full_record() -> ShortCircuit {
    ShortCircuit::FullRecord
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Per-record deadline in seconds; 0 disables it.
    #[serde(default = "default_deadline")]
    pub deadline_secs: u64,

    /// Records enriched concurrently in batch mode.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default)]
    pub short_circuit: ShortCircuitConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline(),
            concurrency: default_concurrency(),
            short_circuit: ShortCircuitConfig::default(),
        }
    }
}

fn default_deadline() -> u64 {
    300
}
fn default_concurrency() -> usize {
    4
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.leadenrich/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| EnrichError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.leadenrich/leadenrich.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| EnrichError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| EnrichError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| EnrichError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| EnrichError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| EnrichError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the oracle API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    Credential::env(&config.oracle.api_key_env)
        .resolve()
        .map(|_| ())
        .map_err(|_| {
            EnrichError::config(format!(
                "oracle API key not found. Set the {} environment variable.",
                config.oracle.api_key_env
            ))
        })
}
