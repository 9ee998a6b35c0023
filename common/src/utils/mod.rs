pub mod config;
pub mod graph_backend;
pub mod ingest_limits;
pub mod search_backend;
