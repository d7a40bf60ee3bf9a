//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    client::ClientCommands, completions::CompletionsArgs, history::HistoryArgs, init::InitArgs,
    login::LoginArgs, order::OrderCommands, product::ProductCommands, sync::SyncCommands,
};

#[derive(Parser)]
#[command(name = "dolisales")]
#[command(author, version, about = "Offline field-sales companion for Dolibarr")]
#[command(long_about = "Capture clients, products and orders as local JSON files, and pull reference data from a Dolibarr ERP when online.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Data directory (default: platform data directory)
    #[arg(long, global = true, env = "DOLISALES_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory and a config template
    Init(InitArgs),

    /// Client management
    #[command(subcommand)]
    Client(ClientCommands),

    /// Product catalogue
    #[command(subcommand)]
    Product(ProductCommands),

    /// Order capture
    #[command(subcommand)]
    Order(OrderCommands),

    /// Log in to a Dolibarr server
    Login(LoginArgs),

    /// Exchange data with Dolibarr
    #[command(subcommand)]
    Sync(SyncCommands),

    /// Server URLs used at login, most recent first
    History(HistoryArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table for list, details for show)
    #[default]
    Auto,
    /// JSON, in the on-disk document format
    Json,
    /// Tab-separated values (for piping)
    Tsv,
    /// CSV format (for spreadsheets)
    Csv,
    /// Just IDs, one per line
    Id,
}
