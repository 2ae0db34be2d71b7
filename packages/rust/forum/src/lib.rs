//! Discussion-forum research, separate from person enrichment.
//!
//! Refines a verbose product title into a search query, finds matching
//! threads on the forum site, and reads a thread with its comments.

mod reddit;
mod refine;
mod search;

pub use reddit::{Comment, RedditClient, RedditCredentials, ThreadInfo, thread_id_from_url};
pub use refine::refine_title;
pub use search::{ForumSearch, ForumSearchResult};
