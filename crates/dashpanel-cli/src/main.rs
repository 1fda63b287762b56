use clap::{Parser, Subcommand};
use dashpanel_core::{logging, Config};

mod commands;

#[derive(Parser)]
#[command(name = "dashpanel", version, about = "Dashboard broadcasts and integrations from the terminal")]
struct Cli {
    /// Debug logging on stderr (RUST_LOG is honoured)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recent updates panel
    Broadcasts {
        #[command(subcommand)]
        action: commands::broadcasts::BroadcastsAction,
    },
    /// Installed integrations for a project
    Integrations {
        #[command(subcommand)]
        action: commands::integrations::IntegrationsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// API token management
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    logging::init(cli.verbose, &config.log.level);

    let result = match cli.command {
        Commands::Broadcasts { action } => commands::broadcasts::run(action).await,
        Commands::Integrations { action } => commands::integrations::run(action).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Auth { action } => commands::auth::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
