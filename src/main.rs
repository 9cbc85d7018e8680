use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;

/// eventhub - Event registration
#[derive(Parser)]
#[command(name = "eventhub")]
#[command(about = "Accounts, event catalog and registrations over a local store", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Store file (overrides config file)
    #[arg(long, global = true)]
    store: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account and session commands
    #[command(subcommand)]
    User(cli::user::UserCommand),
    /// Browse and manage the event catalog
    #[command(subcommand)]
    Events(cli::event::EventCommand),
    /// Register the current user for an event
    Register { event_id: String },
    /// Cancel the current user's registration for an event
    Unregister { event_id: String },
    /// Detailed registrations of the current user
    #[command(subcommand)]
    Custom(cli::registration::CustomCommand),
    /// Events the current user is registered for
    Registrations,
    /// Compare event counts with the ledger
    Audit {
        /// Also drop registrations for events that no longer exist
        #[arg(long)]
        reconcile: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = eventhub::config::Config::load(cli.config.clone())?;
    if let Some(store) = cli.store {
        config.storage.path = store.into();
    }
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    eventhub::observability::init_observability(
        "eventhub",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    let mut app = eventhub::App::from_config(&config);

    match cli.command {
        Commands::User(command) => cli::user::run(&mut app, command),
        Commands::Events(command) => cli::event::run(&mut app, command),
        Commands::Register { event_id } => cli::registration::register(&mut app, &event_id),
        Commands::Unregister { event_id } => cli::registration::unregister(&mut app, &event_id),
        Commands::Custom(command) => cli::registration::custom(&mut app, command),
        Commands::Registrations => cli::registration::list(&mut app),
        Commands::Audit { reconcile } => cli::registration::audit(&mut app, reconcile),
    }
}
