//! `dolisales login` command - Connect to a Dolibarr server

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Password, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::Workspace;
use crate::cli::GlobalOpts;
use crate::core::Session;
use crate::dolibarr::{login, ReqwestTransport};

#[derive(clap::Args, Debug)]
pub struct LoginArgs {
    /// Server URL (default: pick from recent servers)
    #[arg(long)]
    pub url: Option<String>,

    /// Dolibarr login
    #[arg(long, short = 'u')]
    pub user: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long, env = "DOLISALES_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Store an existing API key instead of logging in
    #[arg(long, conflicts_with = "password")]
    pub api_key: Option<String>,

    /// Forget the saved session
    #[arg(long, conflicts_with_all = ["url", "user", "password", "api_key"])]
    pub logout: bool,
}

pub fn run(args: LoginArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global);

    if args.logout {
        Session::forget(&ws.data_dir).map_err(|e| miette::miette!("{}", e))?;
        if !global.quiet {
            println!("{} Logged out", style("✓").green());
        }
        return Ok(());
    }

    let theme = ColorfulTheme::default();
    let url = match args.url {
        Some(url) => url,
        None => prompt_url(&ws, &theme)?,
    };
    let username = match args.user {
        Some(user) => user,
        None if args.api_key.is_some() => ws.config.user(),
        None => Input::with_theme(&theme)
            .with_prompt("Identifiant")
            .default(ws.config.user())
            .interact_text()
            .into_diagnostic()?,
    };

    let session = match args.api_key {
        Some(key) => Session::new(&url, key, username),
        None => {
            let password = match args.password {
                Some(password) => password,
                None => Password::with_theme(&theme)
                    .with_prompt("Mot de passe")
                    .interact()
                    .into_diagnostic()?,
            };
            let transport = ReqwestTransport::new()?;
            login(&transport, &url, &username, &password)?
        }
    };

    session
        .save(&ws.data_dir)
        .map_err(|e| miette::miette!("{}", e))?;
    ws.data.urls.add(&session.base_url);

    if !global.quiet {
        println!(
            "{} Logged in to {} as {}",
            style("✓").green(),
            style(&session.base_url).cyan(),
            style(&session.username).yellow()
        );
    }
    Ok(())
}

/// Offer recent servers, or ask for a URL when there are none
fn prompt_url(ws: &Workspace, theme: &ColorfulTheme) -> Result<String> {
    let recent = ws.data.urls.entries();
    if recent.is_empty() {
        return Input::with_theme(theme)
            .with_prompt("URL du serveur Dolibarr")
            .interact_text()
            .into_diagnostic();
    }

    let mut choices = recent.clone();
    choices.push("Autre serveur...".to_string());
    let picked = Select::with_theme(theme)
        .with_prompt("Serveur")
        .items(&choices)
        .default(0)
        .interact()
        .into_diagnostic()?;

    match recent.get(picked) {
        Some(url) => Ok(url.clone()),
        None => Input::with_theme(theme)
            .with_prompt("URL du serveur Dolibarr")
            .interact_text()
            .into_diagnostic(),
    }
}
