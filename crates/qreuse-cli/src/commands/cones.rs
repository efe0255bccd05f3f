//! Cones command implementation.

use anyhow::Result;
use console::style;

use qreuse_compile::passes::causal_cones;

use super::common::load_circuit;

/// Execute the cones command.
pub fn execute(input: &str, json: bool) -> Result<()> {
    let circuit = load_circuit(input)?;
    let cones = causal_cones(circuit.dag())?;

    if json {
        let entries: Vec<_> = cones
            .iter()
            .map(|(qubit, cone)| serde_json::json!({ "qubit": qubit, "cone": cone }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!(
        "{} Causal cones of {} ({} qubits, processing order)",
        style("→").cyan().bold(),
        style(input).green(),
        cones.len()
    );
    for (qubit, cone) in cones.iter() {
        let members: Vec<_> = cone.iter().map(ToString::to_string).collect();
        println!(
            "  q{:<4} size {:>3}: {{{}}}",
            style(qubit).yellow(),
            cone.len(),
            members.join(", ")
        );
    }

    Ok(())
}
