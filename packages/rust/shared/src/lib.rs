//! Shared types, error model, and configuration for leadenrich.
//!
//! This crate is the foundation depended on by all other leadenrich crates.
//! It provides:
//! - [`EnrichError`]: the unified error type
//! - The record model ([`EnrichmentRecord`], [`Field`])
//! - Configuration ([`AppConfig`], [`Credential`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, Credential, ForumConfig, MissingCredential, OracleConfig,
    PipelineConfig, ProviderConfig, ResponseMode, ShortCircuit, ShortCircuitConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_api_key,
};
pub use error::{EnrichError, Result};
pub use types::{
    COMPANY_FIELDS, EnrichmentRecord, Field, PERSON_FIELDS, PROFILE_URL_ALIAS, is_present,
    prefer_present,
};
