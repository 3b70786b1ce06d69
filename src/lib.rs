pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{InMemoryRepository, JsonRepository};
pub use crate::config::toml_config::TomlConfig;
pub use crate::core::definition::{PropertyDefinition, TypeDefinition};
pub use crate::core::merge::{ResolveIssue, Resolved};
pub use crate::core::registry::{BuildSummary, NodeTypeRegistry, NodeTypes};
pub use crate::domain::model::{PropertyValue, RepositoryNode};
pub use crate::utils::error::{NodeTypeError, Result};
