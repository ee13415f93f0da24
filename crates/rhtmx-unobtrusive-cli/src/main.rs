mod commands;
mod page;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "rhtmx-val")]
#[command(version, about = "Inspect and check data-val-* validation rules in HTML", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (defaults to ./unobtrusive.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rules and messages of every form as JSON
    Inspect {
        /// HTML file to read
        file: PathBuf,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Validate values against the rules of an HTML file (exit code 1 when invalid)
    Check {
        /// HTML file to read
        file: PathBuf,

        /// Field value to fill in before validating
        #[arg(long = "value", value_name = "NAME=VALUE", value_parser = page::parse_assignment)]
        values: Vec<(String, String)>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Execute command
    match cli.command {
        Commands::Inspect { file, pretty } => {
            commands::inspect::execute(&file, cli.config.as_deref(), pretty)?;
        }
        Commands::Check { file, values } => {
            let valid = commands::check::execute(&file, cli.config.as_deref(), &values)?;
            if !valid {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
