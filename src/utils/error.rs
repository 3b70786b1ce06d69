use thiserror::Error;

#[derive(Error, Debug)]
pub enum NodeTypeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Repository error: {message}")]
    RepositoryError { message: String },

    #[error("Path not found in repository: {path}")]
    PathNotFound { path: String },

    #[error("Node {node} has no property {property}")]
    MissingProperty { node: String, property: String },

    #[error("Property {property} on {node} is not a {expected}")]
    PropertyTypeError {
        node: String,
        property: String,
        expected: &'static str,
    },

    #[error("Could not build node definitions, died at {node}: {source}")]
    MalformedDefinition {
        node: String,
        #[source]
        source: Box<NodeTypeError>,
    },

    #[error("Unknown node type: {name}")]
    UnknownType { name: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Repository,
    Definition,
    Lookup,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl NodeTypeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            NodeTypeError::IoError(_)
            | NodeTypeError::SerializationError(_)
            | NodeTypeError::RepositoryError { .. }
            | NodeTypeError::PathNotFound { .. } => ErrorCategory::Repository,
            NodeTypeError::MissingProperty { .. }
            | NodeTypeError::PropertyTypeError { .. }
            | NodeTypeError::MalformedDefinition { .. } => ErrorCategory::Definition,
            NodeTypeError::UnknownType { .. } => ErrorCategory::Lookup,
            NodeTypeError::ConfigError { .. }
            | NodeTypeError::ConfigValidationError { .. }
            | NodeTypeError::InvalidConfigValueError { .. }
            | NodeTypeError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Lookup => ErrorSeverity::Low,
            ErrorCategory::Repository => ErrorSeverity::Medium,
            ErrorCategory::Definition => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            NodeTypeError::IoError(_) => "Check that the repository export file exists and is readable",
            NodeTypeError::SerializationError(_) => {
                "Re-export the node types as JSON (e.g. /jcr:system/jcr:nodeTypes.infinity.json)"
            }
            NodeTypeError::RepositoryError { .. } => "Check the repository connection and try again",
            NodeTypeError::PathNotFound { .. } => {
                "Check root_path and mount_path; the export may be mounted at a different path"
            }
            NodeTypeError::MissingProperty { .. }
            | NodeTypeError::PropertyTypeError { .. }
            | NodeTypeError::MalformedDefinition { .. } => {
                "The node type record is incomplete; re-export it or fix the record"
            }
            NodeTypeError::UnknownType { .. } => "Run without --type to list the known primary types",
            NodeTypeError::ConfigError { .. }
            | NodeTypeError::ConfigValidationError { .. }
            | NodeTypeError::InvalidConfigValueError { .. }
            | NodeTypeError::MissingConfigError { .. } => "Fix the configuration file or command line flags",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            NodeTypeError::MalformedDefinition { node, .. } => {
                format!("Node type record at {} could not be read", node)
            }
            NodeTypeError::PathNotFound { path } => format!("Nothing found at {}", path),
            NodeTypeError::UnknownType { name } => format!("No node type named {}", name),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NodeTypeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_definition_names_node() {
        let err = NodeTypeError::MalformedDefinition {
            node: "/jcr:system/jcr:nodeTypes/cq:Broken".to_string(),
            source: Box::new(NodeTypeError::MissingProperty {
                node: "/jcr:system/jcr:nodeTypes/cq:Broken".to_string(),
                property: "jcr:nodeTypeName".to_string(),
            }),
        };

        assert!(err.to_string().contains("cq:Broken"));
        assert!(err.to_string().contains("jcr:nodeTypeName"));
        assert_eq!(err.category(), ErrorCategory::Definition);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_unknown_type_is_low_severity() {
        let err = NodeTypeError::UnknownType {
            name: "nt:nothing".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.user_friendly_message(), "No node type named nt:nothing");
    }
}
