use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ioc",
    about = "Inspect and check ioc object definition documents",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List every definition with its scope and type
    List(DocumentArgs),
    /// Show one definition in full
    Show(ShowArgs),
    /// Validate every definition without building anything
    Check(DocumentArgs),
    /// Print the context hash of a document
    Hash(DocumentArgs),
}

#[derive(Args)]
pub struct DocumentArgs {
    /// Definition document (.json or .toml)
    pub document: PathBuf,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Definition document (.json or .toml)
    pub document: PathBuf,
    /// Object identifier
    pub id: String,
}
