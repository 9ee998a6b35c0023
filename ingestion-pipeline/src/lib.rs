pub mod pipeline;

pub use pipeline::{IngestionConfig, IngestionPipeline};
