use clap::Parser;
use jcr_nodetypes::core::ConfigProvider;
use jcr_nodetypes::utils::error::{ErrorSeverity, NodeTypeError};
use jcr_nodetypes::utils::{logger, validation::Validate};
use jcr_nodetypes::{CliConfig, JsonRepository, NodeTypeRegistry, NodeTypes, TomlConfig};
use serde_json::json;

fn exit_with(e: &NodeTypeError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn load_settings(cli: &CliConfig) -> Result<(Box<dyn ConfigProvider>, Option<TomlConfig>), NodeTypeError> {
    match &cli.config {
        Some(path) => {
            let mut config = TomlConfig::from_file(path)?;
            // command line overrides the file
            if let Some(repository) = &cli.repository {
                config.repository.source = repository.clone();
            }
            config.validate()?;
            Ok((Box::new(config.clone()), Some(config)))
        }
        None => {
            cli.validate()?;
            Ok((Box::new(cli.clone()), None))
        }
    }
}

fn print_type(types: &NodeTypes, name: &str, as_json: bool) -> Result<(), NodeTypeError> {
    let definition = types.lookup(name).ok_or_else(|| NodeTypeError::UnknownType {
        name: name.to_string(),
    })?;
    let properties = definition.merged_properties(types, true);
    let children = definition.child_suggestions(types);

    for issue in properties.issues.iter().chain(children.issues.iter()) {
        tracing::warn!("⚠️  {}", issue);
    }

    if as_json {
        let properties: serde_json::Map<String, serde_json::Value> = properties
            .entries
            .iter()
            .map(|(name, property)| -> Result<_, serde_json::Error> {
                Ok((name.clone(), serde_json::to_value(property.default_value())?))
            })
            .collect::<Result<_, _>>()?;
        let output = json!({
            "name": definition.name(),
            "supertypes": definition.supertype_names(),
            "isMixin": definition.is_mixin(),
            "acceptsArbitraryProperties": definition.accepts_arbitrary_properties(),
            "properties": properties,
            "childSuggestions": children.entries,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", definition.name());
    if !definition.supertype_names().is_empty() {
        println!("  supertypes: {}", definition.supertype_names().join(", "));
    }
    println!("  mixin: {}", definition.is_mixin());
    println!(
        "  accepts arbitrary properties: {}",
        definition.accepts_arbitrary_properties()
    );
    println!("  properties:");
    for (name, property) in &properties.entries {
        println!("    {} = {}", name, property.default_value());
    }
    println!("  child suggestions:");
    for (slot, type_name) in &children.entries {
        println!("    {} -> {}", slot, type_name);
    }
    Ok(())
}

async fn run(cli: &CliConfig, settings: &dyn ConfigProvider) -> Result<(), NodeTypeError> {
    let repository = JsonRepository::new(settings.repository_source(), settings.mount_path());
    let registry = NodeTypeRegistry::new(settings.root_path());

    let summary = registry.build(&repository).await?;
    tracing::info!(
        "✅ Loaded {} node types from {}",
        summary.type_count,
        repository.source().display()
    );

    let types = registry.snapshot();
    match &cli.type_name {
        Some(name) => print_type(&types, name, cli.json)?,
        None if cli.json => {
            println!("{}", serde_json::to_string_pretty(&types.primary_type_names())?)
        }
        None => {
            for name in types.primary_type_names() {
                println!("{}", name);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let (settings, toml) = match load_settings(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("❌ Configuration validation failed: {}", e);
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // logging
    match &toml {
        Some(config) if config.json_logging() => logger::init_json_logger(config.log_level()),
        Some(config) => logger::init_cli_logger_with_level(cli.verbose, config.log_level()),
        None => logger::init_cli_logger(cli.verbose),
    }

    tracing::info!("🚀 Starting jcr-nodetypes");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli, settings.as_ref()).await {
        exit_with(&e);
    }

    Ok(())
}
