use crate::core::schema::NODE_TYPES_ROOT;
use crate::core::ConfigProvider;
use crate::utils::error::{NodeTypeError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const LOG_FORMATS: [&str; 2] = ["compact", "json"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub repository: RepositoryConfig,
    pub registry: Option<RegistryConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Sling JSON export to read node types from.
    pub source: String,
    /// Repository path the export's top-level object corresponds to.
    pub mount_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub root_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl TomlConfig {
    /// Load the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(NodeTypeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse the configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| NodeTypeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Substitute environment variables such as ${REPOSITORY_EXPORT}.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| NodeTypeError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("repository.source", &self.repository.source)?;
        validation::validate_path("repository.source", &self.repository.source)?;
        validation::validate_repository_path("repository.mount_path", self.mount_path())?;
        validation::validate_repository_path("registry.root_path", self.root_path())?;

        if let Some(format) = self.logging.as_ref().and_then(|l| l.format.as_deref()) {
            validation::validate_one_of("logging.format", format, &LOG_FORMATS)?;
        }

        Ok(())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logging(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .map(|format| format == "json")
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn repository_source(&self) -> &str {
        &self.repository.source
    }

    fn mount_path(&self) -> &str {
        self.repository.mount_path.as_deref().unwrap_or(NODE_TYPES_ROOT)
    }

    fn root_path(&self) -> &str {
        self.registry
            .as_ref()
            .and_then(|r| r.root_path.as_deref())
            .unwrap_or(NODE_TYPES_ROOT)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
