// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archivist - archives chat media and finds it again by description.
//!
//! This is the binary entry point for the Archivist bot.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod search;
mod serve;
mod status;

use clap::{Parser, Subcommand};

/// Archivist - archives chat media and finds it again by description.
#[derive(Parser, Debug)]
#[command(name = "archivist", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the Telegram bot.
    Serve,
    /// Show archive statistics.
    Status {
        /// Output JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Describe and embed files left incomplete by earlier failures.
    Reprocess {
        /// Maximum number of files to process.
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
    /// Resolve a query against the archive and print matching messages.
    Search {
        /// Free-text query.
        #[arg(required = true)]
        query: Vec<String>,
        /// Output JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match archivist_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            archivist_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    serve::init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Status { json }) => status::run_status(&config, json).await,
        Some(Commands::Reprocess { limit }) => serve::run_reprocess(config, limit).await,
        Some(Commands::Search { query, json }) => {
            search::run_search(&config, &query.join(" "), json).await
        }
        None => {
            println!("archivist: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("archivist: {e}");
        std::process::exit(1);
    }
}
