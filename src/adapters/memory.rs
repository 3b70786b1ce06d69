use crate::adapters::json_repository::node_from_json;
use crate::domain::model::RepositoryNode;
use crate::domain::ports::{ContentRepository, RepositorySession};
use crate::utils::error::{NodeTypeError, Result};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A repository over an in-memory tree rooted at `/`. The tree can be replaced
/// between sessions, and open sessions are counted.
pub struct InMemoryRepository {
    root: ArcSwap<RepositoryNode>,
    open_sessions: Arc<AtomicUsize>,
}

impl InMemoryRepository {
    pub fn new(root: RepositoryNode) -> Self {
        Self {
            root: ArcSwap::from_pointee(root),
            open_sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Build the tree from a Sling-style JSON document describing `/`.
    pub fn from_json(document: &serde_json::Value) -> Result<Self> {
        Ok(Self::new(node_from_json("/", document)?))
    }

    pub fn replace_root(&self, root: RepositoryNode) {
        self.root.store(Arc::new(root));
    }

    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }
}

impl ContentRepository for InMemoryRepository {
    type Session = InMemorySession;

    async fn login(&self) -> Result<InMemorySession> {
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(InMemorySession {
            root: self.root.load_full(),
            open_sessions: Some(Arc::clone(&self.open_sessions)),
        })
    }
}

pub struct InMemorySession {
    root: Arc<RepositoryNode>,
    open_sessions: Option<Arc<AtomicUsize>>,
}

#[async_trait]
impl RepositorySession for InMemorySession {
    async fn node(&self, path: &str) -> Result<RepositoryNode> {
        let mut current = self.root.as_ref();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .children()
                .find(|child| child.name == segment)
                .ok_or_else(|| NodeTypeError::PathNotFound {
                    path: path.to_string(),
                })?;
        }
        Ok(current.clone())
    }

    fn logout(&mut self) {
        if let Some(open_sessions) = self.open_sessions.take() {
            open_sessions.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
