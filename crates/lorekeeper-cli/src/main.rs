//! Lorekeeper CLI - Extract knowledge records from documents.

use anyhow::Context;
use clap::Parser;
use lorekeeper_cli::commands;
use lorekeeper_cli::{config, Cli, Command, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Log to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let formatter = Formatter::new(cli.format, !cli.no_color);

    match cli.command {
        Command::Config(args) => commands::execute_config(args)?,
        Command::Validate(args) => {
            let pipeline = config::load(cli.config.as_deref())?;
            let file = args.file.display().to_string();
            commands::execute_validate(args, &pipeline, &formatter)
                .with_context(|| format!("validating {}", file))?;
        }
        Command::Extract(args) => {
            let pipeline = config::load(cli.config.as_deref())?;
            let file = args.file.display().to_string();
            commands::execute_extract(args, pipeline, &formatter)
                .await
                .with_context(|| format!("extracting {}", file))?;
        }
    }

    Ok(())
}
