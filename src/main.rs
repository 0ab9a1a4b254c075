// Copyright 2026 Metalens Contributors
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code, unused_imports)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod cli;
mod error;
mod extract;
mod fetch;
mod files;
mod pipeline;
mod rest;
mod server;
mod url_norm;

#[derive(Parser)]
#[command(
    name = "metalens",
    about = "Metalens — fetch and inspect page metadata",
    version,
    after_help = "Run 'metalens <command> --help' for details on each command.\nRun 'metalens fetch' with no URL to enter it interactively."
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
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a URL and explore its metadata
    Fetch {
        /// Website URL to fetch metadata from (prompted for when omitted)
        url: Option<String>,
        /// Save the metadata to a JSON file (derives a name when FILE is omitted)
        #[arg(long, num_args = 0..=1, value_name = "FILE")]
        save: Option<Option<String>>,
        /// Open the fetched URL in the local preview server
        #[arg(long)]
        preview: bool,
    },
    /// Run the metadata API and preview server
    Serve {
        /// Port to listen on (the next free port is used when taken)
        #[arg(long, default_value_t = server::DEFAULT_PORT)]
        port: u16,
        /// Serve a preview page from this file instead of the built-in one
        #[arg(long, conflicts_with = "html_url")]
        html_file: Option<PathBuf>,
        /// Fetch the preview page from this URL at startup
        #[arg(long)]
        html_url: Option<String>,
    },
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
        std::env::set_var("METALENS_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("METALENS_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("METALENS_VERBOSE", "1");
    }
    if cli.no_color {
        std::env::set_var("METALENS_NO_COLOR", "1");
    }

    let result = match cli.command {
        // No subcommand → interactive fetch
        None => cli::fetch_cmd::run(None, None, false).await,

        Some(Commands::Fetch { url, save, preview }) => {
            cli::fetch_cmd::run(url, save, preview).await
        }
        Some(Commands::Serve {
            port,
            html_file,
            html_url,
        }) => cli::serve_cmd::run(port, html_file, html_url).await,
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "metalens", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}
