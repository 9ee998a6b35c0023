pub mod query_router;
pub mod search;
pub mod sources;

pub use query_router::{QueryRouter, EMPTY_QUERY_ANSWER, NO_KNOWLEDGE_BASE_ANSWER};
pub use search::{parse_max_results, SearchAdapter, DEFAULT_MAX_RESULTS};
