use anyhow::Context;
use chirp_server::{ChirpServer, ServerConfig, StorageConfig};
use colored::Colorize;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::CheckConfig(args) => cmd_check_config(args),
    }
}

/// Layer command-line overrides on top of the config file (or defaults).
fn resolve_config(args: &ConfigArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(path) = &args.db {
        config.storage = StorageConfig::Sqlite { path: path.clone() };
    } else if args.memory {
        config.storage = StorageConfig::Memory;
    }
    Ok(config)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.config)?;
    let server = ChirpServer::new(config).context("opening record store")?;
    println!(
        "{} Chirp listening on {} ({})",
        "✓".green().bold(),
        server.config().bind_addr.to_string().bold(),
        describe_storage(&server.config().storage).cyan(),
    );
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_check_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    print!("{}", config.to_toml()?);
    println!("{} configuration is valid", "✓".green().bold());
    Ok(())
}

fn describe_storage(storage: &StorageConfig) -> String {
    match storage {
        StorageConfig::Memory => "in-memory".into(),
        StorageConfig::Sqlite { path } => format!("sqlite: {}", path.display()),
    }
}
