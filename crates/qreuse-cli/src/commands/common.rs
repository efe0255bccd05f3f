//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use qreuse_ir::Circuit;

/// Load a circuit from a JSON file.
pub fn load_circuit(path: &str) -> Result<Circuit> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;

    Circuit::from_json(&source).with_context(|| format!("Failed to parse circuit: {path}"))
}

/// Save a circuit as JSON.
pub fn save_circuit(circuit: &Circuit, path: &str) -> Result<()> {
    let content = circuit
        .to_json()
        .with_context(|| format!("Failed to encode circuit: {}", circuit.name()))?;

    fs::write(path, content).with_context(|| format!("Failed to write file: {path}"))?;

    Ok(())
}

/// Default output path: `<dir>/<stem>_reused.json` next to the input.
pub fn default_output_path(input: &str) -> String {
    let p = Path::new(input);
    let stem = p.file_stem().unwrap_or_default().to_string_lossy();
    p.with_file_name(format!("{stem}_reused.json"))
        .to_string_lossy()
        .into_owned()
}
