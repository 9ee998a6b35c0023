use std::sync::Arc;

use common::{
    error::AppError,
    storage::{knowledge_base::KnowledgeBaseStore, types::query_result::QueryResult},
    utils::graph_backend::GraphBackend,
};
use tracing::{debug, info, instrument};

use crate::sources::normalize_sources;

pub const EMPTY_QUERY_ANSWER: &str = "Please provide a question to search the knowledge base.";
pub const NO_KNOWLEDGE_BASE_ANSWER: &str =
    "No Knowledge Base active. Please upload documents first to build your knowledge graph.";

/// Answers questions against the active group, or an explicitly named one.
/// Never mutates the knowledge base.
#[derive(Clone)]
pub struct QueryRouter {
    backend: Arc<dyn GraphBackend>,
    knowledge_base: Arc<dyn KnowledgeBaseStore>,
}

impl QueryRouter {
    pub fn new(backend: Arc<dyn GraphBackend>, knowledge_base: Arc<dyn KnowledgeBaseStore>) -> Self {
        Self {
            backend,
            knowledge_base,
        }
    }

    /// The override wins when it is non-blank; otherwise the active group.
    pub fn resolve_group(&self, group_override: Option<&str>) -> Option<String> {
        group_override
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or_else(|| self.knowledge_base.active_group())
    }

    #[instrument(skip_all, fields(query_chars = query.chars().count()))]
    pub async fn answer(
        &self,
        query: &str,
        group_override: Option<&str>,
    ) -> Result<QueryResult, AppError> {
        if query.trim().is_empty() {
            return Ok(QueryResult::message(EMPTY_QUERY_ANSWER));
        }

        let Some(group_id) = self.resolve_group(group_override) else {
            debug!("query received with no active knowledge base");
            return Ok(QueryResult::message(NO_KNOWLEDGE_BASE_ANSWER));
        };

        let preview: String = query.chars().take(50).collect();
        info!(%group_id, query = %preview, "querying knowledge graph");

        let response = self
            .backend
            .query_group(&group_id, query)
            .await
            .map_err(|err| {
                tracing::error!(%group_id, error = %err, "knowledge graph query failed");
                err
            })?;

        let sources = normalize_sources(&response.sources);
        info!(%group_id, source_count = sources.len(), "knowledge graph answered");

        Ok(QueryResult {
            answer: response.answer,
            sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::{
        storage::{
            knowledge_base::InMemoryKnowledgeBase, staging::StagedFile,
            types::query_result::SourceKind,
        },
        utils::graph_backend::{GraphAnswer, ProcessedFile},
    };
    use serde_json::json;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MockGraph {
        fail_with: Option<String>,
        queried: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl GraphBackend for MockGraph {
        async fn upload_and_process(
            &self,
            _files: &[StagedFile],
        ) -> Result<Vec<ProcessedFile>, AppError> {
            unreachable!("queries never upload")
        }

        async fn create_group(
            &self,
            _file_ids: &[String],
            _group_name: &str,
        ) -> Result<String, AppError> {
            unreachable!("queries never create groups")
        }

        async fn query_group(&self, group_id: &str, query: &str) -> Result<GraphAnswer, AppError> {
            self.queried
                .lock()
                .await
                .push((group_id.to_string(), query.to_string()));
            if let Some(message) = &self.fail_with {
                return Err(AppError::Backend(message.clone()));
            }
            Ok(GraphAnswer {
                answer: format!("answer from {group_id}"),
                sources: vec![
                    json!({ "node_type": "video", "video_name": "intro.mp4", "start_time": 1.5 }),
                    json!({ "pdf_name": "notes.pdf", "page_num": 2 }),
                ],
            })
        }
    }

    fn router(backend: Arc<MockGraph>, active_group: Option<&str>) -> QueryRouter {
        let kb = Arc::new(InMemoryKnowledgeBase::new());
        if let Some(group) = active_group {
            kb.append_file_ids(&["file-1".to_string()]);
            kb.set_group(group.to_string());
        }
        QueryRouter::new(backend, kb)
    }

    #[tokio::test]
    async fn test_blank_query_short_circuits_without_backend_call() {
        let backend = Arc::new(MockGraph::default());
        let router = router(backend.clone(), Some("group-1"));

        for query in ["", "   ", "\n\t"] {
            let result = router.answer(query, Some("group-9")).await.expect("ok");
            assert_eq!(result.answer, EMPTY_QUERY_ANSWER);
            assert!(result.sources.is_empty());
        }
        assert!(backend.queried.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_no_group_returns_fixed_message() {
        let backend = Arc::new(MockGraph::default());
        let router = router(backend.clone(), None);

        let result = router.answer("what is in my files?", None).await.expect("ok");

        assert_eq!(result.answer, NO_KNOWLEDGE_BASE_ANSWER);
        assert!(result.sources.is_empty());
        assert!(backend.queried.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_blank_override_falls_back_to_active_group() {
        let backend = Arc::new(MockGraph::default());
        let router = router(backend.clone(), Some("group-active"));

        let result = router.answer("question", Some("  ")).await.expect("ok");

        assert_eq!(result.answer, "answer from group-active");
        assert_eq!(
            backend.queried.lock().await.as_slice(),
            [("group-active".to_string(), "question".to_string())]
        );
    }

    #[tokio::test]
    async fn test_override_wins_over_active_group() {
        let backend = Arc::new(MockGraph::default());
        let router = router(backend.clone(), Some("group-active"));

        let result = router.answer("question", Some("group-other")).await.expect("ok");

        assert_eq!(result.answer, "answer from group-other");
    }

    #[tokio::test]
    async fn test_sources_are_normalized() {
        let backend = Arc::new(MockGraph::default());
        let router = router(backend, Some("group-1"));

        let result = router.answer("question", None).await.expect("ok");

        assert_eq!(result.sources.len(), 2);
        assert_eq!(result.sources[0].node_type, SourceKind::Video);
        assert_eq!(result.sources[0].start_time, Some(1.5));
        assert_eq!(result.sources[1].node_type, SourceKind::Document);
        assert_eq!(result.sources[1].page_num, Some(2));
    }

    #[tokio::test]
    async fn test_backend_failure_is_surfaced_and_state_untouched() {
        let backend = Arc::new(MockGraph {
            fail_with: Some("graph service unavailable".into()),
            ..Default::default()
        });
        let kb = Arc::new(InMemoryKnowledgeBase::new());
        kb.append_file_ids(&["file-1".to_string()]);
        kb.set_group("group-1".into());
        let before = kb.snapshot();
        let router = QueryRouter::new(backend, kb.clone());

        let err = router.answer("question", None).await.expect_err("should fail");

        assert!(matches!(err, AppError::Backend(msg) if msg == "graph service unavailable"));
        assert_eq!(kb.snapshot(), before);
    }
}
