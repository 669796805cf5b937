//! surveyrules CLI — validate, expand and evaluate assessment rules.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(
    name = "surveyrules",
    version,
    about = "Assessment contingency and formula engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate assessment TOML files and check their rules for cycles
    Validate {
        /// Path to assessment file or directory
        #[arg(long)]
        assessment: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the expanded contingency closures and formula trees
    Expand {
        /// Path to assessment file
        #[arg(long)]
        assessment: PathBuf,

        /// Output format: text, json
        #[arg(long)]
        format: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Evaluate visibility and calculated values for one respondent
    Evaluate {
        /// Path to assessment file
        #[arg(long)]
        assessment: PathBuf,

        /// Respondent data file (.toml or .json)
        #[arg(long)]
        responses: PathBuf,

        /// Output format: text, json
        #[arg(long)]
        format: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config, example assessment and example responses
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("surveyrules=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { assessment, config } => {
            commands::validate::execute(assessment, config)
        }
        Commands::Expand {
            assessment,
            format,
            config,
        } => commands::expand::execute(assessment, format, config),
        Commands::Evaluate {
            assessment,
            responses,
            format,
            config,
        } => commands::evaluate::execute(assessment, responses, format, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
