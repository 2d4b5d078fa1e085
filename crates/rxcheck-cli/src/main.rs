mod commands;
mod output;

use clap::{Parser, Subcommand};
use rxcheck_core::config::{default_log_filter, load_config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rxcheck",
    version,
    about = "Prescription safety triage: drug flags, risky combinations and age checks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse prescription text into a structured drug list (without checking)
    Parse {
        /// Path to a plain-text prescription
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write parsed output to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Check a prescription (plain text or parsed JSON) for risks
    Check {
        /// Path to a text prescription or a JSON file with `drugs` and `patient_age`
        input_file: PathBuf,

        /// Custom JSON catalog file
        #[arg(short, long, value_name = "FILE", conflicts_with = "preset")]
        catalog: Option<PathBuf>,

        /// Embedded catalog to use (default: demo)
        #[arg(short, long, value_name = "NAME")]
        preset: Option<String>,

        /// JSON config file (catalog, secondary analysis, log filter)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Secondary analysis to merge in
        #[arg(long, value_parser = ["off", "mock"])]
        secondary: Option<String>,

        /// Override the patient age
        #[arg(long)]
        age: Option<u32>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Show how the score was built up
        #[arg(long)]
        verbose: bool,
    },
    /// Inspect and validate rule catalogs
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List embedded catalogs
    List,
    /// Describe an embedded catalog in plain language
    Explain {
        /// Preset name (e.g., "demo")
        preset: String,
    },
    /// Print the catalog JSON schema with field descriptions and example
    Schema,
    /// Validate a custom catalog file
    Validate {
        /// Path to JSON catalog file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // A broken config is reported by the command itself.
    let log_filter = match &cli.command {
        Commands::Check {
            config: Some(path), ..
        } => load_config(path)
            .map(|c| c.log_filter)
            .unwrap_or_else(|_| default_log_filter()),
        _ => default_log_filter(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Parse {
            input_file,
            output,
            out,
        } => commands::parse::run(input_file, &output, out),
        Commands::Check {
            input_file,
            catalog,
            preset,
            config,
            secondary,
            age,
            output,
            verbose,
        } => commands::check::run(commands::check::CheckArgs {
            input_file,
            catalog,
            preset,
            config,
            secondary,
            age,
            output_format: output,
            verbose,
        }),
        Commands::Catalog { action } => match action {
            CatalogAction::List => commands::catalog::list(),
            CatalogAction::Explain { preset } => commands::catalog::explain(&preset),
            CatalogAction::Schema => commands::catalog::schema(),
            CatalogAction::Validate { file } => commands::catalog::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
