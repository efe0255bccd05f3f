//! Verification of rewritten circuits.
//!
//! Run after [`QubitReuse`](super::QubitReuse) to check that the rebuilt DAG
//! is structurally sound and agrees with the statistics the rewrite
//! reported.

use tracing::debug;

use qreuse_ir::CircuitDag;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

use super::reuse::ReuseStats;

/// Result of reuse verification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationResult {
    /// Whether the verification passed.
    pub passed: bool,
    /// Number of qubits verified.
    pub qubits_checked: usize,
    /// Number of measurements found.
    pub measurements_found: usize,
    /// Number of resets found.
    pub resets_found: usize,
}

/// Analysis pass that checks a rewritten circuit.
///
/// Fails when the DAG is malformed (broken wires, cycles, registers naming
/// unknown bits) or when recorded [`ReuseStats`] claim a qubit count that
/// the DAG does not have or that exceeds the original.
pub struct ReuseVerification;

impl ReuseVerification {
    fn fail(reason: String) -> CompileError {
        CompileError::PassFailed {
            name: "reuse_verification".into(),
            reason,
        }
    }
}

impl Pass for ReuseVerification {
    fn name(&self) -> &'static str {
        "reuse_verification"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        dag.verify_integrity()
            .map_err(|e| Self::fail(e.to_string()))?;

        if let Some(stats) = properties.get::<ReuseStats>() {
            if stats.qubits_after != dag.num_qubits() {
                return Err(Self::fail(format!(
                    "reported {} qubits after reuse, circuit has {}",
                    stats.qubits_after,
                    dag.num_qubits()
                )));
            }
            if stats.qubits_after > stats.qubits_before {
                return Err(Self::fail(format!(
                    "qubit count grew from {} to {}",
                    stats.qubits_before, stats.qubits_after
                )));
            }
        }

        let mut measurements_found = 0;
        let mut resets_found = 0;
        for (_, inst) in dag.topological_ops() {
            if inst.is_measure() {
                measurements_found += 1;
            } else if inst.is_reset() {
                resets_found += 1;
            }
        }

        let result = VerificationResult {
            passed: true,
            qubits_checked: dag.num_qubits(),
            measurements_found,
            resets_found,
        };
        debug!(
            "Reuse verification passed: {} qubits, {} measurements, {} resets",
            result.qubits_checked, result.measurements_found, result.resets_found
        );
        properties.insert(result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::{QubitReuse, ReuseMode};
    use qreuse_ir::{Circuit, ClbitId, QubitId};

    #[test]
    fn test_verification_after_reuse() {
        let mut circuit = Circuit::with_size("pair", 2, 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        circuit.x(QubitId(1)).unwrap();
        circuit.measure(QubitId(1), ClbitId(1)).unwrap();
        let mut dag = circuit.into_dag();
        let mut props = PropertySet::new();

        QubitReuse::normal().run(&mut dag, &mut props).unwrap();
        ReuseVerification.run(&mut dag, &mut props).unwrap();

        let result = props.get::<VerificationResult>().unwrap();
        assert!(result.passed);
        assert_eq!(result.qubits_checked, 1);
        assert_eq!(result.measurements_found, 2);
        assert_eq!(result.resets_found, 1);
    }

    #[test]
    fn test_verification_rejects_stale_stats() {
        let mut dag = Circuit::bell().unwrap().into_dag();
        let mut props = PropertySet::new();
        props.insert(ReuseStats {
            mode: ReuseMode::Normal,
            selected: ReuseMode::Normal,
            qubits_before: 2,
            qubits_after: 1,
            resets_inserted: 0,
            fits_target: None,
        });

        let err = ReuseVerification.run(&mut dag, &mut props).unwrap_err();
        assert!(matches!(err, CompileError::PassFailed { .. }));
    }
}
