//! atcgen - automated test case generator

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing::Level;

mod commands;
mod config;

use commands::{generate, signature};

#[derive(Parser)]
#[command(name = "atcgen")]
#[command(about = "Generate Java and Symbolic PathFinder tests from function specs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build test classes and JPF documents
    Generate {
        /// JSON spec table
        #[arg(long)]
        specs: PathBuf,

        /// Comma separated call sequence
        #[arg(long, value_delimiter = ',', required_unless_present = "calls_file")]
        calls: Vec<String>,

        /// File holding the call sequence (JSON list or comma separated)
        #[arg(long, conflicts_with = "calls")]
        calls_file: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "atcgen-out")]
        out: PathBuf,

        /// Also write the IR as ir.json
        #[arg(long)]
        emit_ir: bool,

        /// Name of the generated class
        #[arg(long)]
        unit_name: Option<String>,

        /// Package of the generated class
        #[arg(long)]
        namespace: Option<String>,

        /// Warn about calls without a spec instead of failing
        #[arg(long)]
        skip_unmatched: bool,

        /// Print inputs before each call
        #[arg(long)]
        echo_inputs: bool,
    },

    /// Print the JPF signature of a declared method
    Signature {
        /// Java source file
        #[arg(long)]
        source: PathBuf,

        /// Method name
        #[arg(long)]
        method: String,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config(cli.config)?;

    match cli.command {
        Commands::Generate {
            specs,
            calls,
            calls_file,
            out,
            emit_ir,
            unit_name,
            namespace,
            skip_unmatched,
            echo_inputs,
        } => {
            let args = generate::GenerateArgs {
                specs,
                calls,
                calls_file,
                out,
                emit_ir,
                unit_name,
                namespace,
                skip_unmatched,
                echo_inputs,
            };
            generate::generate(&args, &config)?;
        }
        Commands::Signature { source, method } => {
            signature::signature(&source, &method)?;
        }
    }

    Ok(())
}
