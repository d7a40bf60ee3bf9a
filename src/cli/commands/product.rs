//! `dolisales product` command - Product catalogue

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{confirm, Workspace};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::codec::{to_document, ProduitSchema};
use crate::entities::Produit;
use crate::filter::search_products;

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// List products
    List(ListArgs),

    /// Add a product to the local catalogue
    New(NewArgs),

    /// Remove a product from the local catalogue
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in label and description
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Product id (default: next free number)
    #[arg(long)]
    pub id: Option<String>,

    /// Label
    #[arg(long, short = 'l')]
    pub libelle: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Unit price excluding VAT
    #[arg(long, short = 'p')]
    pub prix: f64,

    /// VAT rate in percent
    #[arg(long)]
    pub tva: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Product id
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: ProductCommands, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global);
    match cmd {
        ProductCommands::List(args) => run_list(args, &ws, global),
        ProductCommands::New(args) => run_new(args, &ws, global),
        ProductCommands::Delete(args) => run_delete(args, &ws, global),
    }
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("libelle", "LIBELLÉ", 32),
    ColumnDef::new("prix_ht", "PRIX HT", 12),
    ColumnDef::new("tva", "TVA", 8),
    ColumnDef::new("prix_ttc", "PRIX TTC", 12),
];

fn run_list(args: ListArgs, ws: &Workspace, global: &GlobalOpts) -> Result<()> {
    let mut produits = ws.data.produits.load_all();
    if let Some(text) = &args.search {
        produits = search_products(produits, text);
    }
    produits.sort_by_key(|p| p.libelle().to_lowercase());

    if args.count {
        println!("{}", produits.len());
        return Ok(());
    }

    let format = ws.format(global);
    if format == OutputFormat::Json {
        let json =
            to_document::<ProduitSchema>(&produits).map_err(|e| miette::miette!("{}", e))?;
        println!("{}", json);
        return Ok(());
    }

    if produits.is_empty() {
        if format != OutputFormat::Id {
            println!("No products found.");
        }
        return Ok(());
    }

    let rows = produits.iter().map(|p| {
        TableRow::new(p.id())
            .cell("id", CellValue::Id(p.id().to_string()))
            .cell("libelle", CellValue::Text(p.libelle().to_string()))
            .cell("prix_ht", CellValue::Money(p.prix_unitaire()))
            .cell("tva", CellValue::Percent(p.taux_tva()))
            .cell("prix_ttc", CellValue::Money(p.prix_ttc()))
    });
    TableFormatter::new(COLUMNS, "product")
        .quiet(global.quiet)
        .output(rows, format);
    Ok(())
}

fn run_new(args: NewArgs, ws: &Workspace, global: &GlobalOpts) -> Result<()> {
    let id = args.id.unwrap_or_else(|| ws.data.produits.next_id());
    if ws.data.produits.find_by_id(&id).is_some() {
        return Err(miette::miette!("A product with id '{}' already exists", id));
    }

    let mut builder = Produit::builder()
        .id(id)
        .libelle(args.libelle)
        .prix_unitaire(args.prix);
    if let Some(description) = args.description {
        builder = builder.description(description);
    }
    if let Some(tva) = args.tva {
        builder = builder.taux_tva(tva);
    }
    let produit = builder.build()?;

    if !ws.data.produits.add(&produit) {
        return Err(miette::miette!("Failed to save product {}", produit.id()));
    }

    if global.format == OutputFormat::Id {
        println!("{}", produit.id());
    } else if !global.quiet {
        println!(
            "{} Created product {}",
            style("✓").green(),
            style(produit.id()).cyan()
        );
        println!(
            "   {}: {:.2} € HT / {:.2} € TTC",
            style(produit.libelle()).yellow(),
            produit.prix_unitaire(),
            produit.prix_ttc()
        );
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, ws: &Workspace, global: &GlobalOpts) -> Result<()> {
    let produit = ws
        .data
        .produits
        .find_by_id(&args.id)
        .ok_or_else(|| miette::miette!("No product found with id '{}'", args.id))?;

    if !args.yes
        && !confirm(&format!(
            "Delete product {} ({})?",
            produit.id(),
            produit.libelle()
        ))?
    {
        println!("Aborted.");
        return Ok(());
    }

    if !ws.data.produits.delete_by_id(produit.id()) {
        return Err(miette::miette!("Failed to delete product {}", produit.id()));
    }
    if !global.quiet {
        println!(
            "{} Deleted product {}",
            style("✓").green(),
            style(produit.id()).cyan()
        );
    }
    Ok(())
}
