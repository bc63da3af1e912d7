mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use convoy::{Config, Error as ConvoyError, Parser as ConfigParser, Supervisor};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if let Some(convoy_error) = e.downcast_ref::<ConvoyError>() {
            eprintln!("Error: {}", convoy_error);
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing();

    let parser = ConfigParser::new();
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => parser.find_config_file()?,
    };
    let config = parser.load_config(&config_path)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Validate => {
            println!(
                "{}: OK ({} services)",
                config_path.display(),
                config.services.len()
            );
            Ok(())
        }
        Commands::Serve => serve(config).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let listen_port = config.supervisor.listen_port;
    let supervisor = Arc::new(Supervisor::new(config));

    for descriptor in supervisor.registry().list_all() {
        tracing::info!(
            "registered '{}' ({}) on port {}",
            descriptor.identifier,
            descriptor.display_name,
            descriptor.port
        );
    }

    convoy::api::serve(supervisor, listen_port).await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
