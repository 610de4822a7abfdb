use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use mfhist::log::init_logging;

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

impl From<Commands> for mfhist::AppCommand {
    fn from(cmd: Commands) -> mfhist::AppCommand {
        match cmd {
            Commands::Distributions { date } => mfhist::AppCommand::Distributions { date },
            Commands::History { years } => mfhist::AppCommand::History { years },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display distribution history for configured funds
    Distributions {
        /// Show only distributions recorded on this date (MM/DD/YYYY)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Display NAV history joined with distributions
    History {
        /// Years of history to fetch
        #[arg(short, long, default_value_t = 1)]
        years: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => mfhist::run_command(cmd.into(), cli.config_path.as_deref()).await,
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

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = mfhist::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
funds:
  - ticker: "ANCFX"
  - ticker: "AGTHX"
  - ticker: "AFAXX"

money_market:
  - "AFAXX"

sources:
  distributions:
    base_url: "http://localhost:8000/funds"
    mode: per_ticker
  quotes:
    base_url: "https://query1.finance.yahoo.com"
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
