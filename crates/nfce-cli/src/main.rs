//! `nfce` - terminal front-end for the NFCe reader.
//!
//! Wires a line-per-payload stdin scan source to the core coordinator and
//! exposes the backend's stats / data / download / clear actions as
//! subcommands.

mod commands;
mod scan;
mod source;
mod table;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use nfce_core::ApiClient;

#[derive(Parser)]
#[command(name = "nfce", version, about = "NFCe QR receipt reader")]
struct Cli {
    /// Backend base URL.
    #[arg(
        long,
        global = true,
        env = "NFCE_SERVER",
        default_value = "http://127.0.0.1:5000"
    )]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read decoded QR payloads from stdin (one per line) and submit them.
    Scan {
        /// Directory for the per-session scan journal.
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Submit any payload instead of rejecting non-receipt URLs.
        #[arg(long)]
        allow_any_url: bool,
    },

    /// Show aggregate totals for the stored receipts.
    Stats,

    /// Print the stored receipt rows.
    Data,

    /// Save the backend's CSV export.
    Download {
        /// Output path (default: nfce_data_<date>.csv).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Delete all stored receipt data.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let client = Arc::new(ApiClient::new(cli.server));

    match cli.command {
        Command::Scan {
            log_dir,
            allow_any_url,
        } => scan::run(client, log_dir, allow_any_url).await,
        Command::Stats => commands::stats(client).await,
        Command::Data => commands::data(client).await,
        Command::Download { output } => commands::download(client, output).await,
        Command::Clear { yes } => commands::clear(client, yes).await,
    }
}
