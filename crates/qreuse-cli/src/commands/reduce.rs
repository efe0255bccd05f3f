//! Reduce command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;
use tracing::debug;

use qreuse_compile::{PassManagerBuilder, ReuseConfig, ReuseStats, VerificationResult};
use qreuse_ir::Circuit;

use super::common::{default_output_path, load_circuit, save_circuit};

/// Arguments of the reduce command.
pub struct ReduceArgs {
    pub input: String,
    pub output: Option<String>,
    pub mode: Option<String>,
    pub config: Option<PathBuf>,
    pub target: Option<String>,
    pub verify: bool,
}

/// Resolve the configuration: file, then environment, then flags.
fn resolve_config(args: &ReduceArgs) -> Result<ReuseConfig> {
    let mut config = ReuseConfig::load(args.config.as_deref()).with_context(|| {
        match &args.config {
            Some(path) => format!("Failed to load configuration: {}", path.display()),
            None => "Failed to load configuration from environment".to_string(),
        }
    })?;

    if let Some(mode) = &args.mode {
        config.mode = mode.parse()?;
    }
    if let Some(target) = &args.target {
        config.target = Some(target.clone());
    }
    config.verify |= args.verify;
    config.validate()?;

    debug!("Resolved configuration: {:?}", config);
    Ok(config)
}

/// Execute the reduce command.
pub fn execute(args: &ReduceArgs) -> Result<()> {
    let config = resolve_config(args)?;

    println!(
        "{} Reducing {} in {} mode",
        style("→").cyan().bold(),
        style(&args.input).green(),
        style(config.mode).yellow()
    );

    let circuit = load_circuit(&args.input)?;
    let name = circuit.name().to_string();
    println!(
        "  Loaded: {} qubits, {} clbits, depth {}",
        circuit.num_qubits(),
        circuit.num_clbits(),
        circuit.depth()
    );

    let (pm, mut props) = PassManagerBuilder::from_config(&config)?.build();
    println!("  Running passes: {}", pm.pass_names().join(", "));

    let mut dag = circuit.into_dag();
    pm.run(&mut dag, &mut props)?;
    let reduced = Circuit::from_dag_named(name, dag);

    println!("{} Reduction complete", style("✓").green().bold());
    if let Some(stats) = props.get::<ReuseStats>() {
        print_stats(stats);
    }
    if let Some(result) = props.get::<VerificationResult>() {
        println!(
            "  Verified: {} qubits, {} measurements, {} resets",
            result.qubits_checked, result.measurements_found, result.resets_found
        );
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    save_circuit(&reduced, &output)?;
    println!("  Output: {}", style(&output).green());

    Ok(())
}

fn print_stats(stats: &ReuseStats) {
    println!(
        "  Qubits: {} → {} ({} strategy, {} resets)",
        stats.qubits_before,
        style(stats.qubits_after).cyan().bold(),
        stats.selected,
        stats.resets_inserted
    );
    match stats.fits_target {
        Some(true) => println!("  Target: {}", style("fits").green()),
        Some(false) => println!(
            "  Target: {}",
            style("needs more qubits than the target provides").red()
        ),
        None => {}
    }
}
