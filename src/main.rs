// src/main.rs
//
// Kuhaku CLI
//
// Every command prints its result as pretty JSON on stdout. Failures print
// the `ErrorResponse` JSON and exit non-zero.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use kuhaku::application::commands::*;
use kuhaku::application::{AppState, ErrorResponse};
use kuhaku::config::AppConfig;
use kuhaku::logging;

#[derive(Parser, Debug)]
#[command(name = "kuhaku", version, about = "Movie catalog ingestion with TMDB reconciliation")]
struct Cli {
    /// Configuration file (defaults to ./Kuhaku.toml when present)
    #[arg(short, long, env = "KUHAKU_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging for kuhaku
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or migrate the database and print its statistics
    InitDb,

    /// Fetch the listing, resolve new titles on TMDB and store them
    Harvest,

    /// Retry TMDB resolution for pending records
    Reresolve {
        #[arg(short, long, default_value_t = 100)]
        limit: usize,
    },

    /// List catalog records
    Catalog {
        /// resolved, unmatched or pending
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Filter the stored movie list by name and release year
    Movies {
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Search the stored movie list by title and genre ids
    Search {
        title: String,

        /// Required genre id; repeat for several
        #[arg(short, long = "genre")]
        genres: Vec<u32>,
    },

    /// Load a JSON movie list file into the database
    ImportMovies {
        file: PathBuf,

        /// Clear the stored list first
        #[arg(long)]
        replace: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let state = AppState::initialize(config).context("opening the database")?;

    match cli.command {
        Commands::InitDb => print_result(database_stats(&state)),
        Commands::Harvest => {
            let cancel = cancel_on_ctrl_c();
            print_result(run_harvest(&state, cancel).await)
        }
        Commands::Reresolve { limit } => {
            let cancel = cancel_on_ctrl_c();
            print_result(reresolve_pending(&state, limit, cancel).await)
        }
        Commands::Catalog { status } => print_result(list_catalog(&state, status.as_deref())),
        Commands::Movies { name, year } => {
            print_result(filter_movies(&state, name.as_deref(), year))
        }
        Commands::Search { title, genres } => {
            print_result(search_movies(&state, &title, &genres))
        }
        Commands::ImportMovies { file, replace } => {
            print_result(import_movies(&state, &file, replace).map(|imported| {
                serde_json::json!({ "imported": imported, "file": file.display().to_string() })
            }))
        }
    }
}

/// A token cancelled by the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, stopping after the current step");
            token.cancel();
        }
    });

    cancel
}

fn print_result<T: Serialize>(result: Result<T, ErrorResponse>) -> anyhow::Result<()> {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(error) => {
            println!("{}", serde_json::to_string_pretty(&error)?);
            Err(anyhow!(error.to_string()))
        }
    }
}
