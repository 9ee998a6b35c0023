use std::sync::Arc;

use common::{
    error::AppError,
    storage::{
        knowledge_base::{InMemoryKnowledgeBase, KnowledgeBaseStore},
        staging::FileStaging,
    },
    utils::{
        config::AppConfig,
        graph_backend::{graph_backend_from_config, GraphBackend},
        search_backend::{DuckDuckGoSearch, SearchBackend},
    },
};
use ingestion_pipeline::{IngestionConfig, IngestionPipeline};
use retrieval_pipeline::{QueryRouter, SearchAdapter};

#[derive(Clone)]
pub struct ApiState {
    pub config: AppConfig,
    pub knowledge_base: Arc<dyn KnowledgeBaseStore>,
    pub graph_backend: Arc<dyn GraphBackend>,
    pub ingestion: Arc<IngestionPipeline>,
    pub query_router: QueryRouter,
    pub search: SearchAdapter,
}

impl ApiState {
    /// Wires the production backends from configuration.
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let graph_backend = graph_backend_from_config(config);
        let search_backend: Arc<dyn SearchBackend> =
            Arc::new(DuckDuckGoSearch::from_config(config)?);

        Ok(Self::with_backends(
            config,
            Arc::new(InMemoryKnowledgeBase::new()),
            graph_backend,
            search_backend,
        ))
    }

    pub fn with_backends(
        config: &AppConfig,
        knowledge_base: Arc<dyn KnowledgeBaseStore>,
        graph_backend: Arc<dyn GraphBackend>,
        search_backend: Arc<dyn SearchBackend>,
    ) -> Self {
        let ingestion = Arc::new(IngestionPipeline::new(
            Arc::clone(&graph_backend),
            Arc::clone(&knowledge_base),
            FileStaging::from_config(config),
            IngestionConfig::from_app_config(config),
        ));
        let query_router = QueryRouter::new(Arc::clone(&graph_backend), Arc::clone(&knowledge_base));

        Self {
            config: config.clone(),
            knowledge_base,
            graph_backend,
            ingestion,
            query_router,
            search: SearchAdapter::new(search_backend),
        }
    }
}
