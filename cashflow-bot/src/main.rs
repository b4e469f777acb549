use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod handler;
mod ledger;
mod reports;
mod state;
mod sync;
mod telegram;

#[derive(Parser, Debug)]
#[command(name = "cashflow", version, about = "CashFlow budget companion")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default config file under ~/.cashflow
    Init,

    /// Run the interactive Telegram bot (long polling)
    Bot,

    /// Ingest a card-statement CSV into the ledger and report
    Sync {
        /// Path to the statement CSV export
        #[arg(long)]
        csv: PathBuf,

        /// Skip the Telegram sync report
        #[arg(long)]
        no_notify: bool,
    },

    /// Send the weekly digest to the configured chat
    Weekly,

    /// Send the evening reminder with today's status
    Remind,

    /// Print the current budget status to stdout
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init => config::init_config(),
        Command::Bot => {
            let cfg = config::load_config()?;
            handler::Bot::new(cfg)?.run().await
        }
        Command::Sync { csv, no_notify } => {
            let cfg = config::load_config()?;
            sync::run_sync(&cfg, &csv, !no_notify).await
        }
        Command::Weekly => reports::run_weekly(&config::load_config()?).await,
        Command::Remind => reports::run_remind(&config::load_config()?).await,
        Command::Status => reports::print_status(&config::load_config()?),
    }
}
