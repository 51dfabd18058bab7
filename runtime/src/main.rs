// Copyright 2026 Pricewalk Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use pricewalk_runtime::cli;
use pricewalk_runtime::cli::scrape_cmd::ScrapeOptions;

#[derive(Parser)]
#[command(
    name = "pricewalk",
    about = "Pricewalk: per-unit grocery prices from category pages",
    version,
    after_help = "Run 'pricewalk <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Traverse a category page and print normalized items
    Scrape {
        /// Category URL (e.g. "https://www.carrefour.pk/mafpak/en/c/FPAK1000000")
        url: String,
        /// Wall-clock budget in seconds
        #[arg(long)]
        budget_secs: Option<u64>,
        /// Navigation attempts per page
        #[arg(long)]
        max_retries: Option<u32>,
        /// Launch a local Chromium instead of the remote browser
        #[arg(long)]
        local: bool,
    },
    /// Normalize one price against a quantity label
    Normalize {
        /// Price as shown (e.g. "Rs. 1,250.00")
        price: String,
        /// Quantity label (e.g. "500g", "pack of 6")
        #[arg(default_value = "")]
        quantity: String,
        /// Item name, searched together with the quantity
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Start the HTTP REST API
    Serve {
        #[arg(long, default_value = "8000")]
        port: u16,
        /// Launch a local Chromium per request instead of the remote browser
        #[arg(long)]
        local: bool,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("PRICEWALK_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("PRICEWALK_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("PRICEWALK_VERBOSE", "1");
    }
    if cli.no_color {
        std::env::set_var("PRICEWALK_NO_COLOR", "1");
    }

    let default_level = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    cli::init_tracing(default_level);

    let result = match cli.command {
        Commands::Scrape {
            url,
            budget_secs,
            max_retries,
            local,
        } => {
            cli::scrape_cmd::run(
                &url,
                ScrapeOptions {
                    budget_secs,
                    max_retries,
                    local,
                },
            )
            .await
        }
        Commands::Normalize {
            price,
            quantity,
            name,
        } => cli::normalize_cmd::run(&price, &quantity, &name),
        Commands::Serve { port, local } => cli::serve_cmd::run(port, local).await,
        Commands::Doctor => cli::doctor::run().await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "pricewalk", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if cli::output::is_json() {
            cli::output::print_json(&pricewalk_runtime::rest::error_envelope(&format!("{e:#}")));
        } else if !cli::output::is_quiet() {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
