use clap::Parser;
use dolisales::cli::{Cli, Commands};
use dolisales::core::logging;
use miette::Result;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head` or `grep -q` causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    logging::init(logging::level_for(global.verbose, global.quiet));

    match cli.command {
        Commands::Init(args) => dolisales::cli::commands::init::run(args, &global),
        Commands::Client(cmd) => dolisales::cli::commands::client::run(cmd, &global),
        Commands::Product(cmd) => dolisales::cli::commands::product::run(cmd, &global),
        Commands::Order(cmd) => dolisales::cli::commands::order::run(cmd, &global),
        Commands::Login(args) => dolisales::cli::commands::login::run(args, &global),
        Commands::Sync(cmd) => dolisales::cli::commands::sync::run(cmd, &global),
        Commands::History(args) => dolisales::cli::commands::history::run(args, &global),
        Commands::Completions(args) => dolisales::cli::commands::completions::run(args),
    }
}
