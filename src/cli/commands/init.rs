//! `dolisales init` command - Prepare the data directory

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::GlobalOpts;
use crate::codec::{ClientSchema, CommandeSchema, ProduitSchema};
use crate::core::config::CONFIG_FILE;
use crate::core::Config;
use crate::store::history::DEFAULT_FILE_NAME as HISTORY_FILE;
use crate::store::Stored;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config.yaml with the template
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let data_dir = global
        .data_dir
        .clone()
        .unwrap_or_else(Config::default_data_dir);

    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir).into_diagnostic()?;
        if !global.quiet {
            println!(
                "{} Created directory {}",
                style("✓").green(),
                style(data_dir.display()).cyan()
            );
        }
    }

    let config_path = data_dir.join(CONFIG_FILE);
    if config_path.exists() && !args.force {
        println!(
            "{} Config already exists at {}",
            style("!").yellow(),
            style(config_path.display()).cyan()
        );
        println!();
        println!(
            "Use {} to reset it",
            style("dolisales init --force").yellow()
        );
        return Ok(());
    }

    std::fs::write(&config_path, Config::template()).into_diagnostic()?;
    tracing::info!(path = %config_path.display(), "config template written");

    if global.quiet {
        return Ok(());
    }

    println!(
        "{} Initialized dolisales data at {}",
        style("✓").green(),
        style(data_dir.display()).cyan()
    );
    println!();
    println!("Data files:");
    print_structure(&data_dir);
    println!();
    println!("Next steps:");
    println!(
        "  {} Connect to your Dolibarr server",
        style("dolisales login").yellow()
    );
    println!(
        "  {} Download clients and products",
        style("dolisales sync pull").yellow()
    );
    println!(
        "  {} Capture a client offline",
        style("dolisales client new").yellow()
    );
    Ok(())
}

fn print_structure(root: &Path) {
    let files = [
        CONFIG_FILE,
        ClientSchema::FILE_NAME,
        ProduitSchema::FILE_NAME,
        CommandeSchema::FILE_NAME,
        HISTORY_FILE,
    ];

    for file in files {
        let marker = if root.join(file).exists() {
            style("✓").green()
        } else {
            style("·").dim()
        };
        println!("  {} {}", marker, style(file).dim());
    }
}
