use std::sync::{PoisonError, RwLock};

/// Point-in-time view of the knowledge base, both fields read together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBaseSnapshot {
    pub file_ids: Vec<String>,
    pub active_group: Option<String>,
}

impl KnowledgeBaseSnapshot {
    pub fn total_files(&self) -> usize {
        self.file_ids.len()
    }
}

/// State of the single logical knowledge base: every file id ingested so far,
/// in ingestion order, and the group currently targeted by queries.
///
/// Implementations are synchronous and infallible. Callers that need a
/// read-modify-write sequence (append, then rebuild, then commit) must
/// serialize it themselves.
pub trait KnowledgeBaseStore: Send + Sync {
    fn file_ids(&self) -> Vec<String>;

    fn active_group(&self) -> Option<String>;

    /// Appends ids as given. Duplicates are kept.
    fn append_file_ids(&self, new_ids: &[String]);

    fn set_group(&self, group_id: String);

    /// Clears the file ids and the active group in one step.
    fn reset(&self);

    fn snapshot(&self) -> KnowledgeBaseSnapshot;

    fn total_files(&self) -> usize {
        self.file_ids().len()
    }
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryKnowledgeBase {
    inner: RwLock<KnowledgeBaseSnapshot>,
}

impl InMemoryKnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KnowledgeBaseStore for InMemoryKnowledgeBase {
    fn file_ids(&self) -> Vec<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .file_ids
            .clone()
    }

    fn active_group(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .active_group
            .clone()
    }

    fn append_file_ids(&self, new_ids: &[String]) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .file_ids
            .extend_from_slice(new_ids);
    }

    fn set_group(&self, group_id: String) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .active_group = Some(group_id);
    }

    fn reset(&self) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.file_ids.clear();
        state.active_group = None;
    }

    fn snapshot(&self) -> KnowledgeBaseSnapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn total_files(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .file_ids
            .len()
    }
}
