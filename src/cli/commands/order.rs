//! `dolisales order` command - Order capture

use chrono::Utc;
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{confirm, format_money, parse_day, parse_day_end, Workspace};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::codec::{encode, to_document, CommandeSchema};
use crate::entities::{Commande, LigneCommande};
use crate::filter::CommandeFilter;

#[derive(Subcommand, Debug)]
pub enum OrderCommands {
    /// List orders with filtering
    List(ListArgs),

    /// Capture a new order
    New(NewArgs),

    /// Show an order with its lines
    Show(ShowArgs),

    /// Lock every line of an order
    Validate(ValidateArgs),

    /// Delete an order
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only orders for this client id
    #[arg(long, short = 'c')]
    pub client: Option<String>,

    /// Only orders taken by this user
    #[arg(long, short = 'u')]
    pub user: Option<String>,

    /// Orders on or after this day (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// Orders on or before this day (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<String>,

    /// Minimum order total
    #[arg(long)]
    pub min_total: Option<f64>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Client id
    #[arg(long, short = 'c')]
    pub client: String,

    /// Order line as PRODUCT_ID:QUANTITY[:DISCOUNT%] (repeatable)
    #[arg(long = "line", short = 'l', required = true)]
    pub lines: Vec<String>,

    /// Order id (default: next free number)
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Order id
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Order id
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Order id
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: OrderCommands, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global);
    match cmd {
        OrderCommands::List(args) => run_list(args, &ws, global),
        OrderCommands::New(args) => run_new(args, &ws, global),
        OrderCommands::Show(args) => run_show(args, &ws, global),
        OrderCommands::Validate(args) => run_validate(args, &ws, global),
        OrderCommands::Delete(args) => run_delete(args, &ws, global),
    }
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("date", "DATE", 12),
    ColumnDef::new("client", "CLIENT", 28),
    ColumnDef::new("lignes", "LIGNES", 7),
    ColumnDef::new("total", "TOTAL", 14),
    ColumnDef::new("etat", "ÉTAT", 9),
];

fn run_list(args: ListArgs, ws: &Workspace, global: &GlobalOpts) -> Result<()> {
    let filter = CommandeFilter {
        client_id: args.client,
        utilisateur: args.user,
        since: args.since.as_deref().map(parse_day).transpose()?,
        until: args.until.as_deref().map(parse_day_end).transpose()?,
        min_total: args.min_total,
    };
    let mut commandes = filter.apply(ws.data.commandes.load_all());
    commandes.sort_by_key(Commande::date_commande);

    if args.count {
        println!("{}", commandes.len());
        return Ok(());
    }

    let format = ws.format(global);
    if format == OutputFormat::Json {
        let json =
            to_document::<CommandeSchema>(&commandes).map_err(|e| miette::miette!("{}", e))?;
        println!("{}", json);
        return Ok(());
    }

    if commandes.is_empty() {
        if format != OutputFormat::Id {
            println!("No orders found.");
        }
        return Ok(());
    }

    let rows = commandes.iter().map(|c| {
        TableRow::new(c.id())
            .cell("id", CellValue::Id(c.id().to_string()))
            .cell("date", CellValue::Date(c.date_commande()))
            .cell("client", CellValue::Text(c.client().nom().to_string()))
            .cell("lignes", CellValue::Number(c.lignes_commande().len() as i64))
            .cell("total", CellValue::Money(c.montant_total()))
            .cell("etat", CellValue::Validated(c.is_validated()))
    });
    TableFormatter::new(COLUMNS, "order")
        .quiet(global.quiet)
        .output(rows, format);
    Ok(())
}

/// Parse `PRODUCT_ID:QUANTITY[:DISCOUNT]`
fn parse_line_arg(raw: &str) -> Result<(String, i64, f64)> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    let (product, quantity, discount) = match parts.as_slice() {
        [product, quantity] => (*product, *quantity, None),
        [product, quantity, discount] => (*product, *quantity, Some(*discount)),
        _ => {
            return Err(miette::miette!(
                "Invalid line '{}' (expected PRODUCT_ID:QUANTITY[:DISCOUNT])",
                raw
            ))
        }
    };
    if product.is_empty() {
        return Err(miette::miette!("Invalid line '{}': missing product id", raw));
    }
    let quantity = quantity
        .parse::<i64>()
        .map_err(|_| miette::miette!("Invalid quantity '{}' in line '{}'", quantity, raw))?;
    let discount = match discount {
        Some(d) => d
            .trim_end_matches('%')
            .parse::<f64>()
            .map_err(|_| miette::miette!("Invalid discount '{}' in line '{}'", d, raw))?,
        None => 0.0,
    };
    Ok((product.to_string(), quantity, discount))
}

fn run_new(args: NewArgs, ws: &Workspace, global: &GlobalOpts) -> Result<()> {
    let client = ws
        .data
        .clients
        .find_by_id(&args.client)
        .ok_or_else(|| miette::miette!("No client found with id '{}'", args.client))?;

    let id = args.id.unwrap_or_else(|| ws.data.commandes.next_id());
    if ws.data.commandes.find_by_id(&id).is_some() {
        return Err(miette::miette!("An order with id '{}' already exists", id));
    }

    let catalogue = ws.data.produits.load_all();
    let mut builder = Commande::builder()
        .id(id)
        .client(client)
        .utilisateur(ws.config.user())
        .date_commande(Utc::now());

    for raw in &args.lines {
        let (product_id, quantite, remise) = parse_line_arg(raw)?;
        let produit = catalogue
            .iter()
            .find(|p| p.id() == product_id)
            .cloned()
            .ok_or_else(|| miette::miette!("No product found with id '{}'", product_id))?;
        let ligne = LigneCommande::builder()
            .produit(produit)
            .quantite(quantite)
            .remise(remise)
            .build()?;
        builder = builder.add_ligne(ligne);
    }
    let commande = builder.build()?;

    if !ws.data.commandes.add(&commande) {
        return Err(miette::miette!("Failed to save order {}", commande.id()));
    }

    if global.format == OutputFormat::Id {
        println!("{}", commande.id());
    } else if !global.quiet {
        println!(
            "{} Created order {} for {}",
            style("✓").green(),
            style(commande.id()).cyan(),
            style(commande.client().nom()).yellow()
        );
        println!(
            "   {} line(s), total {}",
            commande.lignes_commande().len(),
            style(format_money(commande.montant_total())).bold()
        );
    }
    Ok(())
}

fn find(ws: &Workspace, id: &str) -> Result<Commande> {
    ws.data
        .commandes
        .find_by_id(id)
        .ok_or_else(|| miette::miette!("No order found with id '{}'", id))
}

fn run_show(args: ShowArgs, ws: &Workspace, global: &GlobalOpts) -> Result<()> {
    let commande = find(ws, &args.id)?;

    match ws.format(global) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&encode::<CommandeSchema>(&commande))
                .into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Id => println!("{}", commande.id()),
        _ => {
            let client = commande.client();
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {}",
                style("Commande").bold(),
                style(commande.id()).cyan()
            );
            println!(
                "{}: {} ({})",
                style("Client").bold(),
                style(client.nom()).yellow(),
                client.id()
            );
            println!(
                "{}: {} {}, {}",
                style("Adresse").bold(),
                client.code_postal(),
                client.ville(),
                client.adresse()
            );
            println!("{}", style("─".repeat(60)).dim());

            for ligne in commande.lignes_commande() {
                let marker = if ligne.validee() {
                    style("✓").green()
                } else {
                    style("•").dim()
                };
                let remise = if ligne.remise() > 0.0 {
                    format!(" (-{} %)", ligne.remise())
                } else {
                    String::new()
                };
                println!(
                    "  {} {} x {} @ {}{} = {}",
                    marker,
                    ligne.quantite(),
                    ligne.produit().libelle(),
                    format_money(ligne.produit().prix_unitaire()),
                    remise,
                    style(format_money(ligne.montant_ligne())).bold()
                );
            }

            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {}",
                style("Total").bold(),
                style(format_money(commande.montant_total())).green().bold()
            );
            println!(
                "{}: {} | {}: {} | {}: {}",
                style("Saisie par").dim(),
                commande.utilisateur(),
                style("Le").dim(),
                commande.date_commande().format("%Y-%m-%d %H:%M"),
                style("État").dim(),
                if commande.is_validated() { "validée" } else { "ouverte" }
            );
        }
    }
    Ok(())
}

fn run_validate(args: ValidateArgs, ws: &Workspace, global: &GlobalOpts) -> Result<()> {
    let commande = find(ws, &args.id)?;
    if commande.is_validated() {
        if !global.quiet {
            println!(
                "{} Order {} is already validated",
                style("!").yellow(),
                style(commande.id()).cyan()
            );
        }
        return Ok(());
    }

    let validated = commande.validate_lines();
    if !ws.data.commandes.modify_by_id(&validated) {
        return Err(miette::miette!("Failed to save order {}", commande.id()));
    }
    if !global.quiet {
        println!(
            "{} Validated order {} ({} line(s) locked)",
            style("✓").green(),
            style(validated.id()).cyan(),
            validated.lignes_commande().len()
        );
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, ws: &Workspace, global: &GlobalOpts) -> Result<()> {
    let commande = find(ws, &args.id)?;

    if !args.yes
        && !confirm(&format!(
            "Delete order {} ({})?",
            commande.id(),
            format_money(commande.montant_total())
        ))?
    {
        println!("Aborted.");
        return Ok(());
    }

    if !ws.data.commandes.delete_by_id(commande.id()) {
        return Err(miette::miette!("Failed to delete order {}", commande.id()));
    }
    if !global.quiet {
        println!(
            "{} Deleted order {}",
            style("✓").green(),
            style(commande.id()).cyan()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_arg() {
        assert_eq!(parse_line_arg("7:3").unwrap(), ("7".to_string(), 3, 0.0));
        assert_eq!(parse_line_arg("7:3:10").unwrap(), ("7".to_string(), 3, 10.0));
        assert_eq!(parse_line_arg("7 : 2 : 5%").unwrap(), ("7".to_string(), 2, 5.0));
    }

    #[test]
    fn test_parse_line_arg_errors() {
        assert!(parse_line_arg("7").is_err());
        assert!(parse_line_arg(":3").is_err());
        assert!(parse_line_arg("7:x").is_err());
        assert!(parse_line_arg("7:1:a:b").is_err());
    }
}
