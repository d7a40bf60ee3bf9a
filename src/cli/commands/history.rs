//! `dolisales history` command - Recent server URLs

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::Workspace;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    /// Record a URL without logging in
    #[arg(long, conflicts_with = "clear")]
    pub add: Option<String>,

    /// Forget every recorded URL
    #[arg(long)]
    pub clear: bool,
}

pub fn run(args: HistoryArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global);
    let urls = &ws.data.urls;

    if args.clear {
        if !urls.clear() {
            return Err(miette::miette!("Failed to clear URL history"));
        }
        if !global.quiet {
            println!("{} URL history cleared", style("✓").green());
        }
        return Ok(());
    }

    if let Some(url) = args.add {
        if !urls.add(&url) {
            return Err(miette::miette!("Failed to record '{}'", url));
        }
    }

    let entries = urls.entries();
    match ws.format(global) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries).into_diagnostic()?);
        }
        OutputFormat::Auto if entries.is_empty() => {
            if !global.quiet {
                println!("No servers used yet.");
            }
        }
        OutputFormat::Auto => {
            for (i, url) in entries.iter().enumerate() {
                println!("{:>3}  {}", style(i + 1).dim(), style(url).cyan());
            }
        }
        _ => {
            for url in &entries {
                println!("{}", url);
            }
        }
    }
    Ok(())
}
