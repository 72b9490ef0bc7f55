use anyhow::Result;
use argdash::core::log::init_logging;
use argdash::core::view::Tab;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for argdash::AppCommand {
    fn from(cmd: Commands) -> argdash::AppCommand {
        match cmd {
            Commands::Show { tab, search } => argdash::AppCommand::Show { tab, search },
            Commands::Calc { amount } => argdash::AppCommand::Calc { amount },
            Commands::Watch => argdash::AppCommand::Watch,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Print one tab: stocks, bonds, ons, mep, favorites, comparison, calculator
    Show {
        #[arg(default_value = "stocks")]
        tab: Tab,
        /// Filter by symbol (stocks, bonds and ons only)
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Compute the MEP dollars an amount of pesos buys
    Calc {
        /// Amount in pesos
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Live dashboard with auto refresh
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => argdash::cli::setup::setup(),
        Some(cmd) => argdash::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
