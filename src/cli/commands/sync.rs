//! `dolisales sync` command - Exchange data with Dolibarr

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::Workspace;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Session;
use crate::dolibarr::{pull, DolibarrClient, ReqwestTransport};
use crate::store::MergeStats;

#[derive(Subcommand, Debug)]
pub enum SyncCommands {
    /// Download clients and products; local records are kept
    Pull,
}

pub fn run(cmd: SyncCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SyncCommands::Pull => run_pull(global),
    }
}

fn run_pull(global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global);
    let session =
        Session::resolve(&ws.config, &ws.data_dir).map_err(|e| miette::miette!("{}", e))?;

    let client = DolibarrClient::new(session, ReqwestTransport::new()?);
    let report = pull(&client, &ws.data)?;

    if ws.format(global) == OutputFormat::Json {
        let json = serde_json::json!({
            "clients": stats_json(&report.clients),
            "produits": stats_json(&report.produits),
            "saveFailed": report.save_failed,
        });
        println!("{}", json);
    } else if !global.quiet {
        println!(
            "{} Pulled from {}",
            style("✓").green(),
            style(&client.session().base_url).cyan()
        );
        print_stats("Clients", &report.clients);
        print_stats("Produits", &report.produits);
    }

    if report.save_failed {
        return Err(miette::miette!(
            "Some data could not be saved to {}",
            ws.data_dir.display()
        ));
    }
    Ok(())
}

fn stats_json(stats: &MergeStats) -> serde_json::Value {
    serde_json::json!({
        "added": stats.added,
        "updated": stats.updated,
        "keptLocal": stats.kept_local,
    })
}

fn print_stats(label: &str, stats: &MergeStats) {
    println!(
        "   {}: {} added, {} updated, {} local kept",
        style(label).bold(),
        style(stats.added).cyan(),
        style(stats.updated).cyan(),
        stats.kept_local
    );
}
