use crate::core::customization;
use crate::core::definition::{PropertyDefinition, TypeDefinition};
use crate::core::merge::Resolved;
use crate::core::schema::NODE_TYPES_ROOT;
use crate::domain::model::RepositoryNode;
use crate::domain::ports::{ContentRepository, RepositorySession};
use crate::utils::error::{NodeTypeError, Result};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// An immutable set of node type definitions, keyed by type name.
#[derive(Debug, Default)]
pub struct NodeTypes {
    types: HashMap<String, Arc<TypeDefinition>>,
    built_at: Option<DateTime<Utc>>,
}

impl NodeTypes {
    pub fn from_definitions<I>(definitions: I) -> Self
    where
        I: IntoIterator<Item = TypeDefinition>,
    {
        let types = definitions
            .into_iter()
            .map(|definition| (definition.name().to_string(), Arc::new(definition)))
            .collect();
        Self {
            types,
            built_at: None,
        }
    }

    pub fn has_definitions(&self) -> bool {
        !self.types.is_empty()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name).map(Arc::as_ref)
    }

    /// Names of all non-mixin types, sorted.
    pub fn primary_type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .types
            .values()
            .filter(|definition| !definition.is_mixin())
            .map(|definition| definition.name().to_string())
            .collect();
        names.sort();
        names
    }

    pub fn merged_properties(
        &self,
        name: &str,
        include_primary_type: bool,
    ) -> Option<Resolved<PropertyDefinition>> {
        self.lookup(name)
            .map(|definition| definition.merged_properties(self, include_primary_type))
    }

    pub fn child_suggestions(&self, name: &str) -> Option<Resolved<String>> {
        self.lookup(name)
            .map(|definition| definition.child_suggestions(self))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values().map(Arc::as_ref)
    }

    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.built_at
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildSummary {
    pub type_count: usize,
    pub mixin_count: usize,
    pub customized_count: usize,
    pub elapsed: Duration,
}

/// Logs the session out when dropped, whichever way the build exits.
struct SessionGuard<S: RepositorySession> {
    session: S,
}

impl<S: RepositorySession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: RepositorySession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.session.logout();
        tracing::debug!("Repository session released");
    }
}

/// Owns the current [`NodeTypes`] snapshot and rebuilds it from a repository.
///
/// Readers load the snapshot without blocking. A build reads into a fresh
/// snapshot and swaps it in only when every record parsed, so a failed build
/// leaves the previous snapshot in place.
pub struct NodeTypeRegistry {
    root_path: String,
    snapshot: ArcSwap<NodeTypes>,
    build_lock: tokio::sync::Mutex<()>,
}

impl Default for NodeTypeRegistry {
    fn default() -> Self {
        Self::new(NODE_TYPES_ROOT)
    }
}

impl NodeTypeRegistry {
    pub fn new(root_path: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            snapshot: ArcSwap::from_pointee(NodeTypes::default()),
            build_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    pub fn snapshot(&self) -> Arc<NodeTypes> {
        self.snapshot.load_full()
    }

    pub async fn build<R: ContentRepository>(&self, repository: &R) -> Result<BuildSummary> {
        let _building = self.build_lock.lock().await;
        let started = Instant::now();
        tracing::info!("Started building node definitions from {}", self.root_path);

        let session = SessionGuard {
            session: repository.login().await?,
        };
        let root = session.node(&self.root_path).await?;

        let (types, mut summary) = match read_definitions(&root) {
            Ok(read) => read,
            Err(e) => {
                tracing::warn!("Node type build aborted, keeping previous definitions: {}", e);
                return Err(e);
            }
        };

        summary.elapsed = started.elapsed();
        self.snapshot.store(Arc::new(NodeTypes {
            types,
            built_at: Some(Utc::now()),
        }));

        tracing::info!(
            "Finished building {} node definitions ({} mixins, {} customized) in {:?}",
            summary.type_count,
            summary.mixin_count,
            summary.customized_count,
            summary.elapsed
        );
        Ok(summary)
    }

    pub fn has_definitions(&self) -> bool {
        self.snapshot.load().has_definitions()
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<TypeDefinition>> {
        self.snapshot.load().types.get(name).cloned()
    }

    pub fn primary_type_names(&self) -> Vec<String> {
        self.snapshot.load().primary_type_names()
    }

    pub fn merged_properties(
        &self,
        name: &str,
        include_primary_type: bool,
    ) -> Option<Resolved<PropertyDefinition>> {
        self.snapshot
            .load()
            .merged_properties(name, include_primary_type)
    }

    pub fn child_suggestions(&self, name: &str) -> Option<Resolved<String>> {
        self.snapshot.load().child_suggestions(name)
    }
}

fn read_definitions(
    root: &RepositoryNode,
) -> Result<(HashMap<String, Arc<TypeDefinition>>, BuildSummary)> {
    let mut types = HashMap::new();

    for node in root.children() {
        tracing::trace!("Reading node type record {}", node.path);
        let mut definition =
            TypeDefinition::from_node(node).map_err(|e| NodeTypeError::MalformedDefinition {
                node: node.path.clone(),
                source: Box::new(e),
            })?;
        customization::customize(&mut definition);

        let name = definition.name().to_string();
        if types.insert(name, Arc::new(definition)).is_some() {
            tracing::warn!("Duplicate node type record at {}, keeping the last one", node.path);
        }
    }

    let summary = BuildSummary {
        type_count: types.len(),
        mixin_count: types.values().filter(|d| d.is_mixin()).count(),
        customized_count: types
            .keys()
            .filter(|name| customization::rule_for(name).is_some())
            .count(),
        elapsed: Duration::ZERO,
    };
    Ok((types, summary))
}
