use crate::domain::model::RepositoryNode;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Something that can open read sessions on a content repository.
pub trait ContentRepository: Send + Sync {
    type Session: RepositorySession;

    fn login(&self) -> impl std::future::Future<Output = Result<Self::Session>> + Send;
}

#[async_trait]
pub trait RepositorySession: Send + Sync {
    /// Read the node at an absolute path together with its subtree.
    async fn node(&self, path: &str) -> Result<RepositoryNode>;

    /// Release the session. Called exactly once by the owner.
    fn logout(&mut self);
}

pub trait ConfigProvider: Send + Sync {
    fn repository_source(&self) -> &str;
    fn mount_path(&self) -> &str;
    fn root_path(&self) -> &str;
}
