pub mod group;
pub mod health;
pub mod ingest;
pub mod query;
pub mod search;
