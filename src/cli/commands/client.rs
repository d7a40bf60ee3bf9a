//! `dolisales client` command - Client management

use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{confirm, Workspace};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::codec::{encode, to_document, ClientSchema};
use crate::core::validation::check_client_field;
use crate::entities::Client;
use crate::filter::{ClientFilter, CommandeFilter};

#[derive(Subcommand, Debug)]
pub enum ClientCommands {
    /// List clients with filtering
    List(ListArgs),

    /// Capture a new client
    New(NewArgs),

    /// Show a client's details
    Show(ShowArgs),

    /// Change fields of a client
    Edit(EditArgs),

    /// Delete a client
    Delete(DeleteArgs),
}

/// Origin filter
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OriginFilter {
    /// Downloaded from Dolibarr
    Erp,
    /// Captured on this machine
    Local,
    All,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SortField {
    Id,
    Nom,
    Ville,
    Date,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in name, address, city and phone
    #[arg(long)]
    pub search: Option<String>,

    /// Postal code prefix (e.g. 69 for the Rhône)
    #[arg(long)]
    pub postal: Option<String>,

    /// Filter by origin
    #[arg(long, default_value = "all")]
    pub origin: OriginFilter,

    /// Sort by field
    #[arg(long, default_value = "nom")]
    pub sort: SortField,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Client id (default: next free number)
    #[arg(long)]
    pub id: Option<String>,

    /// Name or company name
    #[arg(long)]
    pub nom: Option<String>,

    /// Street address
    #[arg(long)]
    pub adresse: Option<String>,

    /// Postal code (5 digits)
    #[arg(long)]
    pub code_postal: Option<String>,

    #[arg(long)]
    pub ville: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Phone number (10 digits)
    #[arg(long)]
    pub telephone: Option<String>,

    /// Interactive mode (prompt for missing fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Client id
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Client id
    pub id: String,

    #[arg(long)]
    pub nom: Option<String>,

    #[arg(long)]
    pub adresse: Option<String>,

    #[arg(long)]
    pub code_postal: Option<String>,

    #[arg(long)]
    pub ville: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub telephone: Option<String>,

    /// Also refresh the client details stored in existing orders
    #[arg(long, short = 'p')]
    pub propagate: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Client id
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run a client subcommand
pub fn run(cmd: ClientCommands, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global);
    match cmd {
        ClientCommands::List(args) => run_list(args, &ws, global),
        ClientCommands::New(args) => run_new(args, &ws, global),
        ClientCommands::Show(args) => run_show(args, &ws, global),
        ClientCommands::Edit(args) => run_edit(args, &ws, global),
        ClientCommands::Delete(args) => run_delete(args, &ws, global),
    }
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("nom", "NOM", 28),
    ColumnDef::new("ville", "VILLE", 20),
    ColumnDef::new("code_postal", "CP", 7),
    ColumnDef::new("telephone", "TÉLÉPHONE", 12),
    ColumnDef::new("origin", "ORIGINE", 8),
];

fn run_list(args: ListArgs, ws: &Workspace, global: &GlobalOpts) -> Result<()> {
    let filter = ClientFilter {
        text: args.search,
        code_postal: args.postal,
        from_api: match args.origin {
            OriginFilter::Erp => Some(true),
            OriginFilter::Local => Some(false),
            OriginFilter::All => None,
        },
    };
    let mut clients = filter.apply(ws.data.clients.load_all());

    match args.sort {
        SortField::Id => clients.sort_by_key(|c| {
            (crate::core::entity::numeric_id(c.id()), c.id().to_string())
        }),
        SortField::Nom => clients.sort_by_key(|c| c.nom().to_lowercase()),
        SortField::Ville => clients.sort_by_key(|c| c.ville().to_lowercase()),
        SortField::Date => clients.sort_by_key(Client::date_saisie),
    }
    if args.reverse {
        clients.reverse();
    }
    if let Some(limit) = args.limit {
        clients.truncate(limit);
    }

    if args.count {
        println!("{}", clients.len());
        return Ok(());
    }

    let format = ws.format(global);
    if format == OutputFormat::Json {
        let json = to_document::<ClientSchema>(&clients).map_err(|e| miette::miette!("{}", e))?;
        println!("{}", json);
        return Ok(());
    }

    if clients.is_empty() {
        if format != OutputFormat::Id {
            println!("No clients found.");
        }
        return Ok(());
    }

    let rows = clients.iter().map(|c| {
        TableRow::new(c.id())
            .cell("id", CellValue::Id(c.id().to_string()))
            .cell("nom", CellValue::Text(c.nom().to_string()))
            .cell("ville", CellValue::Text(c.ville().to_string()))
            .cell("code_postal", CellValue::Text(c.code_postal().to_string()))
            .cell("telephone", CellValue::Text(c.telephone().to_string()))
            .cell("origin", CellValue::Origin(c.from_api()))
    });
    TableFormatter::new(COLUMNS, "client")
        .quiet(global.quiet)
        .output(rows, format);
    Ok(())
}

fn run_new(args: NewArgs, ws: &Workspace, global: &GlobalOpts) -> Result<()> {
    let id = args.id.unwrap_or_else(|| ws.data.clients.next_id());
    if ws.data.clients.find_by_id(&id).is_some() {
        return Err(miette::miette!("A client with id '{}' already exists", id));
    }

    let mut fields = [
        ("Nom", "nom", args.nom),
        ("Adresse", "adresse", args.adresse),
        ("Code postal", "codePostal", args.code_postal),
        ("Ville", "ville", args.ville),
        ("Email", "adresseMail", args.email),
        ("Téléphone", "telephone", args.telephone),
    ];

    if args.interactive {
        let theme = ColorfulTheme::default();
        for (prompt, key, value) in fields.iter_mut().filter(|(_, _, v)| v.is_none()) {
            let key: &'static str = *key;
            let answer: String = Input::with_theme(&theme)
                .with_prompt(*prompt)
                .validate_with(move |input: &String| check_client_field(key, input))
                .interact_text()
                .into_diagnostic()?;
            *value = Some(answer);
        }
    }

    let [nom, adresse, code_postal, ville, email, telephone] = fields.map(|(_, _, v)| v);
    let mut builder = Client::builder()
        .id(id)
        .utilisateur(ws.config.user())
        .date_saisie(Utc::now());
    if let Some(v) = nom {
        builder = builder.nom(v);
    }
    if let Some(v) = adresse {
        builder = builder.adresse(v);
    }
    if let Some(v) = code_postal {
        builder = builder.code_postal(v);
    }
    if let Some(v) = ville {
        builder = builder.ville(v);
    }
    if let Some(v) = email {
        builder = builder.adresse_mail(v);
    }
    if let Some(v) = telephone {
        builder = builder.telephone(v);
    }
    let client = builder.build()?;

    if !ws.data.clients.add(&client) {
        return Err(miette::miette!("Failed to save client {}", client.id()));
    }

    if global.format == OutputFormat::Id {
        println!("{}", client.id());
    } else if !global.quiet {
        println!(
            "{} Created client {}",
            style("✓").green(),
            style(client.id()).cyan()
        );
        println!("   Nom: {}", style(client.nom()).yellow());
    }
    Ok(())
}

fn find(ws: &Workspace, id: &str) -> Result<Client> {
    ws.data
        .clients
        .find_by_id(id)
        .ok_or_else(|| miette::miette!("No client found with id '{}'", id))
}

fn run_show(args: ShowArgs, ws: &Workspace, global: &GlobalOpts) -> Result<()> {
    let client = find(ws, &args.id)?;

    match ws.format(global) {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&encode::<ClientSchema>(&client)).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Id => println!("{}", client.id()),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(client.id()).cyan());
            println!("{}: {}", style("Nom").bold(), style(client.nom()).yellow());
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("Adresse").bold(), client.adresse());
            println!(
                "{}: {} {}",
                style("Ville").bold(),
                client.code_postal(),
                client.ville()
            );
            println!("{}: {}", style("Email").bold(), client.adresse_mail());
            println!("{}: {}", style("Téléphone").bold(), client.telephone());

            let orders = CommandeFilter {
                client_id: Some(client.id().to_string()),
                ..Default::default()
            }
            .apply(ws.data.commandes.load_all());
            if !orders.is_empty() {
                println!();
                println!("{} ({}):", style("Commandes").bold(), orders.len());
                for order in &orders {
                    println!(
                        "  • {} du {} - {:.2} €",
                        order.id(),
                        order.date_commande().format("%Y-%m-%d"),
                        order.montant_total()
                    );
                }
            }

            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {} | {}: {} | {}: {}",
                style("Saisi par").dim(),
                client.utilisateur(),
                style("Le").dim(),
                client.date_saisie().format("%Y-%m-%d %H:%M"),
                style("Origine").dim(),
                if client.from_api() { "Dolibarr" } else { "locale" }
            );
        }
    }
    Ok(())
}

fn run_edit(args: EditArgs, ws: &Workspace, global: &GlobalOpts) -> Result<()> {
    let current = find(ws, &args.id)?;

    let mut builder = current.to_builder();
    if let Some(v) = args.nom {
        builder = builder.nom(v);
    }
    if let Some(v) = args.adresse {
        builder = builder.adresse(v);
    }
    if let Some(v) = args.code_postal {
        builder = builder.code_postal(v);
    }
    if let Some(v) = args.ville {
        builder = builder.ville(v);
    }
    if let Some(v) = args.email {
        builder = builder.adresse_mail(v);
    }
    if let Some(v) = args.telephone {
        builder = builder.telephone(v);
    }
    let client = builder.build()?;

    let outcome = ws.data.update_client(&client, args.propagate);
    if !outcome.stored {
        return Err(miette::miette!("Failed to save client {}", client.id()));
    }

    if !global.quiet {
        println!(
            "{} Updated client {}",
            style("✓").green(),
            style(client.id()).cyan()
        );
        if args.propagate {
            println!(
                "   {} order(s) refreshed",
                style(outcome.orders_updated).cyan()
            );
        }
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, ws: &Workspace, global: &GlobalOpts) -> Result<()> {
    let client = find(ws, &args.id)?;

    let orders = CommandeFilter {
        client_id: Some(client.id().to_string()),
        ..Default::default()
    }
    .apply(ws.data.commandes.load_all())
    .len();
    if orders > 0 && !global.quiet {
        println!(
            "{} {} order(s) keep their copy of this client",
            style("!").yellow(),
            orders
        );
    }

    if !args.yes && !confirm(&format!("Delete client {} ({})?", client.id(), client.nom()))? {
        println!("Aborted.");
        return Ok(());
    }

    if !ws.data.clients.delete_by_id(client.id()) {
        return Err(miette::miette!("Failed to delete client {}", client.id()));
    }
    if !global.quiet {
        println!(
            "{} Deleted client {}",
            style("✓").green(),
            style(client.id()).cyan()
        );
    }
    Ok(())
}
