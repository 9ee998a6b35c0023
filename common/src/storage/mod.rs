pub mod knowledge_base;
pub mod staging;
pub mod types;
