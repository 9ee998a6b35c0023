pub mod ingest_result;
pub mod query_result;
pub mod search_result;
