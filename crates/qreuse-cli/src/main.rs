//! qreuse Command-Line Interface
//!
//! Rewrites circuits stored as JSON so they run on fewer qubits.
//!
//! ```text
//! qreuse reduce -i circuit.json -o reduced.json --mode dual --target linear:5
//! qreuse cones -i circuit.json
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{cones, reduce, version};

/// qreuse - qubit reuse via mid-circuit measurement and reset
#[derive(Parser)]
#[command(name = "qreuse")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a circuit to use fewer qubits
    Reduce {
        /// Input circuit (JSON)
        #[arg(short, long)]
        input: String,

        /// Output file (defaults to <input>_reused.json)
        #[arg(short, long)]
        output: Option<String>,

        /// Reuse mode (default, normal, dual)
        #[arg(short, long)]
        mode: Option<String>,

        /// Configuration file (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Target coupling map, e.g. linear:5, star:5, full:5
        #[arg(short, long)]
        target: Option<String>,

        /// Verify the rewritten circuit
        #[arg(long)]
        verify: bool,
    },

    /// Print the causal cone of every qubit in processing order
    Cones {
        /// Input circuit (JSON)
        #[arg(short, long)]
        input: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Reduce {
            input,
            output,
            mode,
            config,
            target,
            verify,
        } => reduce::execute(&reduce::ReduceArgs {
            input,
            output,
            mode,
            config,
            target,
            verify,
        }),

        Commands::Cones { input, json } => cones::execute(&input, json),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
