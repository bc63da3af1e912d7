use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "convoy")]
#[command(about = "Convoy - supervise a fixed fleet of local services")]
pub struct Cli {
    /// Config file path (defaults to convoy.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the supervisor and its management API (default)
    Serve,
    /// Validate the configuration file and exit
    Validate,
}
