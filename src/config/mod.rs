pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::schema::NODE_TYPES_ROOT;
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "jcr-nodetypes")]
#[command(about = "Resolve JCR node type definitions from a repository export")]
pub struct CliConfig {
    #[arg(long, help = "Sling JSON export of the node types (e.g. nodeTypes.infinity.json)")]
    pub repository: Option<String>,

    #[arg(long, default_value = NODE_TYPES_ROOT, help = "Repository path the export is mounted at")]
    pub mount_path: String,

    #[arg(long, default_value = NODE_TYPES_ROOT)]
    pub root_path: String,

    #[arg(short, long, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(short = 't', long = "type", help = "Show the resolved definition of one type")]
    pub type_name: Option<String>,

    #[arg(long, help = "Print results as JSON")]
    pub json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn repository_source(&self) -> &str {
        self.repository.as_deref().unwrap_or_default()
    }

    fn mount_path(&self) -> &str {
        &self.mount_path
    }

    fn root_path(&self) -> &str {
        &self.root_path
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let source = validation::validate_required_field("repository", &self.repository)?;
        validation::validate_path("repository", source)?;
        validation::validate_repository_path("mount_path", &self.mount_path)?;
        validation::validate_repository_path("root_path", &self.root_path)?;
        Ok(())
    }
}
