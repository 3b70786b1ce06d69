pub mod customization;
pub mod definition;
pub mod merge;
pub mod registry;
pub mod schema;

pub use crate::domain::model::{PropertyValue, RepositoryNode};
pub use crate::domain::ports::{ConfigProvider, ContentRepository, RepositorySession};
pub use crate::utils::error::Result;
