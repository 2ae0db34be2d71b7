//! Capability gateways: the external lookups the oracle and stages use.
//!
//! Each capability is a trait so stages can be wired with real HTTP
//! clients or in-memory doubles. Calls are one-shot with no caching or
//! retry, and credentials are resolved from the environment on every call.

mod anymail;
mod capability;
mod error;
mod fanout;
mod http;
mod scrapin;
mod serpapi;

pub use anymail::AnymailFinderClient;
pub use capability::{
    EmailCandidate, EmailFinder, EmailQuery, GatewayResult, ProfileDetail, ProfileQuery,
    ProfileSearch, SearchHit, WebSearch,
};
pub use error::GatewayError;
pub use fanout::FanoutProfileSearch;
pub use scrapin::ScrapinClient;
pub use serpapi::SerpApiClient;
